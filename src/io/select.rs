//! Tiered multiplexed wait over a view of endpoints plus one cancellation case.
//!
//! A view is a slice of `Option<&C>` slots. `None` is an inert placeholder: it keeps
//! its index but can never be chosen. Views of up to 4, 8 or 16 slots are copied
//! into fixed arrays and waited on with [`crossbeam::select!`], padding unused
//! cases with endpoints that never become ready. Larger views build a
//! [`Select`] case list at call time. All strategies choose uniformly at random
//! among the cases that are ready, the cancellation case included.

use crate::error::{RecvError, SendError};
use crate::io::tier::Tier;
use crate::utils::CancelToken;
use crossbeam::channel::{self as cbchan, Receiver, Select, Sender};
use std::convert::Infallible;

/// Result of a multiplexed wait that was not aborted by a disconnected endpoint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub enum Outcome<T> {
    /// An endpoint completed; carries its index (and the value for receives).
    Ready(T),
    /// The cancellation case was chosen. No endpoint was touched.
    Cancelled,
}

impl<T> Outcome<T> {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    #[inline]
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Cancelled => None,
        }
    }

    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(v) => Outcome::Ready(f(v)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}

/// Zero-capacity channel whose receiver is held but never polled,
/// so a send on it can never complete.
///
/// crossbeam has no send-side counterpart of `never()`, so padding a send view
/// costs one channel allocation. Views that fill their tier exactly skip it.
struct InertSender<E> {
    tx: Sender<E>,
    _rx: Receiver<E>,
}

impl<E> InertSender<E> {
    fn new() -> Self {
        let (tx, _rx) = cbchan::bounded(0);
        Self { tx, _rx }
    }
}

/// Copy the live slots of `view` into a fixed array, filling the rest with `inert`.
#[inline]
fn pad<'a, C, const K: usize>(view: &[Option<&'a C>], inert: &'a C) -> [&'a C; K] {
    debug_assert!(view.len() <= K);
    let mut cases = [inert; K];
    for (case, slot) in cases.iter_mut().zip(view) {
        if let Some(endpoint) = *slot {
            *case = endpoint;
        }
    }
    cases
}

/// The view as a fixed array if it fills all `K` slots with live endpoints.
#[inline]
fn exact<'a, C, const K: usize>(view: &[Option<&'a C>]) -> Option<[&'a C; K]> {
    if view.len() != K {
        return None;
    }
    let first = view[0]?;
    let mut cases = [first; K];
    for (case, slot) in cases.iter_mut().zip(view) {
        *case = (*slot)?;
    }
    Some(cases)
}

fn assert_live<C>(view: &[Option<&C>]) {
    assert!(
        view.iter().any(Option::is_some),
        "cannot select among zero endpoints"
    );
}

macro_rules! fixed_send {
    ($name:ident, $arity:literal, [$($i:literal),+ $(,)?]) => {
        fn $name<E>(
            cases: [&Sender<E>; $arity],
            value: E,
            done: &Receiver<Infallible>,
        ) -> Result<Outcome<usize>, SendError<E>> {
            crossbeam::select! {
                recv(done) -> _ => Ok(Outcome::Cancelled),
                $(
                    send(cases[$i], value) -> res => match res {
                        Ok(()) => Ok(Outcome::Ready($i)),
                        Err(err) => Err(SendError::closed($i, err.into_inner())),
                    },
                )+
            }
        }
    };
}

macro_rules! fixed_recv {
    ($name:ident, $arity:literal, [$($i:literal),+ $(,)?]) => {
        fn $name<E>(
            cases: [&Receiver<E>; $arity],
            done: &Receiver<Infallible>,
        ) -> Result<Outcome<(usize, E)>, RecvError> {
            crossbeam::select! {
                recv(done) -> _ => Ok(Outcome::Cancelled),
                $(
                    recv(cases[$i]) -> res => match res {
                        Ok(v) => Ok(Outcome::Ready(($i, v))),
                        Err(_) => Err(RecvError::Disconnected { index: $i }),
                    },
                )+
            }
        }
    };
}

fixed_send!(send4, 4, [0, 1, 2, 3]);
fixed_send!(send8, 8, [0, 1, 2, 3, 4, 5, 6, 7]);
fixed_send!(send16, 16, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);

fixed_recv!(recv4, 4, [0, 1, 2, 3]);
fixed_recv!(recv8, 8, [0, 1, 2, 3, 4, 5, 6, 7]);
fixed_recv!(recv16, 16, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);

fn send_dynamic<E>(
    view: &[Option<&Sender<E>>],
    value: E,
    done: &Receiver<Infallible>,
) -> Result<Outcome<usize>, SendError<E>> {
    let mut sel = Select::new();
    let cancel_case = sel.recv(done);

    // case index - 1 -> slot index
    let mut slots = Vec::with_capacity(view.len());
    for (index, slot) in view.iter().enumerate() {
        if let Some(tx) = *slot {
            sel.send(tx);
            slots.push(index);
        }
    }

    let oper = sel.select();
    let case = oper.index();
    if case == cancel_case {
        let _ = oper.recv(done);
        return Ok(Outcome::Cancelled);
    }

    let index = slots[case - 1];
    let Some(tx) = view[index] else {
        unreachable!("placeholder slots are never registered");
    };
    match oper.send(tx, value) {
        Ok(()) => Ok(Outcome::Ready(index)),
        Err(err) => Err(SendError::closed(index, err.into_inner())),
    }
}

fn recv_dynamic<E>(
    view: &[Option<&Receiver<E>>],
    done: &Receiver<Infallible>,
) -> Result<Outcome<(usize, E)>, RecvError> {
    let mut sel = Select::new();
    let cancel_case = sel.recv(done);

    let mut slots = Vec::with_capacity(view.len());
    for (index, slot) in view.iter().enumerate() {
        if let Some(rx) = *slot {
            sel.recv(rx);
            slots.push(index);
        }
    }

    let oper = sel.select();
    let case = oper.index();
    if case == cancel_case {
        let _ = oper.recv(done);
        return Ok(Outcome::Cancelled);
    }

    let index = slots[case - 1];
    let Some(rx) = view[index] else {
        unreachable!("placeholder slots are never registered");
    };
    match oper.recv(rx) {
        Ok(v) => Ok(Outcome::Ready((index, v))),
        Err(_) => Err(RecvError::Disconnected { index }),
    }
}

/// Block until `value` is handed to exactly one live slot of `view`, or `cancel` fires.
///
/// # Panics
///
/// Panics if `view` has no live slot.
pub(crate) fn select_send<E>(
    view: &[Option<&Sender<E>>],
    value: E,
    cancel: &CancelToken,
) -> Result<Outcome<usize>, SendError<E>> {
    assert_live(view);
    let done = cancel.done();

    match Tier::for_len(view.len()) {
        Tier::Four => match exact(view) {
            Some(cases) => send4(cases, value, done),
            None => {
                let inert = InertSender::new();
                send4(pad(view, &inert.tx), value, done)
            }
        },
        Tier::Eight => match exact(view) {
            Some(cases) => send8(cases, value, done),
            None => {
                let inert = InertSender::new();
                send8(pad(view, &inert.tx), value, done)
            }
        },
        Tier::Sixteen => match exact(view) {
            Some(cases) => send16(cases, value, done),
            None => {
                let inert = InertSender::new();
                send16(pad(view, &inert.tx), value, done)
            }
        },
        Tier::Dynamic => send_dynamic(view, value, done),
    }
}

/// Block until one live slot of `view` yields a value, or `cancel` fires.
///
/// # Panics
///
/// Panics if `view` has no live slot.
pub(crate) fn select_recv<E>(
    view: &[Option<&Receiver<E>>],
    cancel: &CancelToken,
) -> Result<Outcome<(usize, E)>, RecvError> {
    assert_live(view);
    let done = cancel.done();

    match Tier::for_len(view.len()) {
        Tier::Four => {
            let inert = cbchan::never();
            recv4(pad(view, &inert), done)
        }
        Tier::Eight => {
            let inert = cbchan::never();
            recv8(pad(view, &inert), done)
        }
        Tier::Sixteen => {
            let inert = cbchan::never();
            recv16(pad(view, &inert), done)
        }
        Tier::Dynamic => recv_dynamic(view, done),
    }
}
