use crossbeam::channel::{self as cbchan, Receiver, Sender};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::fmt;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Internal cancellation state, shared via [`Arc`].
///
/// The `done` receiver never carries a message. Dropping `trigger` disconnects it,
/// which makes every present and future receive on it ready at once.
struct CancelState {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<Infallible>>>,
    done: Receiver<Infallible>,
    children: Mutex<Vec<Weak<CancelState>>>,
}

impl CancelState {
    #[inline]
    fn new_root() -> Arc<Self> {
        let (tx, rx) = cbchan::bounded(0);
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            trigger: Mutex::new(Some(tx)),
            done: rx,
            children: Mutex::new(Vec::new()),
        })
    }

    /// Create a child state registered with `parent`.
    fn child_of(parent: &Arc<CancelState>) -> Arc<Self> {
        let child = Self::new_root();
        {
            let mut children = parent.children.lock();
            children.retain(|w| w.strong_count() > 0);
            children.push(Arc::downgrade(&child));
        }
        // The parent may have fired after the push missed its drain.
        if parent.is_cancelled() {
            child.cancel();
        }
        child
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        drop(self.trigger.lock().take());

        let children = std::mem::take(&mut *self.children.lock());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }

    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Hierarchical, level-triggered cancellation token.
///
/// A `CancelToken` can be cloned cheaply, checked at any time and waited on as one
/// case of a multiplexed select through [`CancelToken::done`]. Once fired it stays
/// fired. Cancelling a parent token cancels all of its children.
#[derive(Clone)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new_root()
    }
}

impl CancelToken {
    /// Create a new root cancellation token.
    #[inline]
    pub fn new_root() -> Self {
        Self {
            state: CancelState::new_root(),
        }
    }

    /// Cancel this token (and propagate to all children). Idempotent.
    #[inline]
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Check if this token has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Create a new child token linked to this one.
    #[inline]
    pub fn new_child(&self) -> Self {
        Self {
            state: CancelState::child_of(&self.state),
        }
    }

    /// Receiver that becomes ready (disconnected) once the token is cancelled.
    ///
    /// It never yields a value, so a receive on it only ever returns `Err`.
    #[inline]
    pub fn done(&self) -> &Receiver<Infallible> {
        &self.state.done
    }

    /// Returns a guard that cancels this token when dropped.
    pub fn drop_guard(&self) -> CancelGuard {
        CancelGuard {
            token: Some(self.clone()),
        }
    }

    /// Sleep until the token is cancelled or the specified duration has elapsed.
    /// If the token is cancelled, return false, otherwise return true.
    pub fn sleep_cancellable(&self, total: Duration) -> bool {
        crossbeam::select! {
            recv(self.done()) -> _ => false,
            recv(cbchan::after(total)) -> _ => !self.is_cancelled(),
        }
    }
}

/// Cancels the wrapped token on drop unless [`CancelGuard::disarm`] was called.
#[derive(Debug)]
pub struct CancelGuard {
    token: Option<CancelToken>,
}

impl CancelGuard {
    /// Release the token without cancelling it.
    pub fn disarm(mut self) -> CancelToken {
        match self.token.take() {
            Some(token) => token,
            None => unreachable!("guard token taken twice"),
        }
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
