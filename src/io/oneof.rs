use crate::error::{DeliveryError, RecvError, SendError};
use crate::io::select::{Outcome, select_recv, select_send};
use crate::io::tier::MAX_FIXED_ARITY;
use crate::utils::CancelToken;
use crossbeam::channel::{Receiver, Sender};

/// Completion record of [`send_each`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Delivery {
    /// Endpoint indices in the order they took a value.
    pub order: Vec<usize>,
    /// True if every endpoint took exactly one value.
    pub completed: bool,
}

impl Delivery {
    /// Returns true if `order` holds every index of `[0, n)` exactly once.
    pub fn is_permutation_of(&self, n: usize) -> bool {
        if self.order.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &i in &self.order {
            match seen.get_mut(i) {
                Some(s) if !*s => *s = true,
                _ => return false,
            }
        }
        true
    }
}

/// Run `f` over a view where every endpoint is live. Views that fit a fixed tier
/// live on the stack.
#[inline]
fn with_full_view<C, R>(endpoints: &[C], f: impl FnOnce(&[Option<&C>]) -> R) -> R {
    if endpoints.len() <= MAX_FIXED_ARITY {
        let mut slots = [None; MAX_FIXED_ARITY];
        for (slot, endpoint) in slots.iter_mut().zip(endpoints) {
            *slot = Some(endpoint);
        }
        f(&slots[..endpoints.len()])
    } else {
        let slots: Vec<_> = endpoints.iter().map(Some).collect();
        f(&slots)
    }
}

/// Hand `value` to exactly one of `endpoints`, whichever has a receiver waiting
/// first, or give up when `cancel` fires.
///
/// Blocks without bound until one of the two happens. Among endpoints that are
/// ready at the same time (and the cancellation, if it has fired) the choice is
/// uniformly random. On [`Outcome::Cancelled`] the value is dropped and no
/// endpoint was touched.
///
/// # Errors
///
/// Returns the value back if the chosen endpoint has no receiver left.
///
/// # Panics
///
/// Panics if `endpoints` is empty.
pub fn send_one<E>(
    endpoints: &[Sender<E>],
    value: E,
    cancel: &CancelToken,
) -> Result<Outcome<usize>, SendError<E>> {
    let outcome = with_full_view(endpoints, |view| select_send(view, value, cancel))?;
    match outcome {
        Outcome::Ready(index) => tracing::trace!(index, n = endpoints.len(), "send_one delivered"),
        Outcome::Cancelled => tracing::trace!(n = endpoints.len(), "send_one cancelled"),
    }
    Ok(outcome)
}

/// Take one value from whichever of `endpoints` has a sender waiting first, or
/// give up when `cancel` fires.
///
/// Same blocking and fairness rules as [`send_one`]. There is no exhaustive
/// counterpart: a receiver generally does not know how many values to expect,
/// so callers loop until they see [`Outcome::Cancelled`] or their own protocol
/// says they are done.
///
/// # Errors
///
/// Returns [`RecvError::Disconnected`] if the chosen endpoint has no sender left.
///
/// # Panics
///
/// Panics if `endpoints` is empty.
pub fn recv_one<E>(
    endpoints: &[Receiver<E>],
    cancel: &CancelToken,
) -> Result<Outcome<(usize, E)>, RecvError> {
    let outcome = with_full_view(endpoints, |view| select_recv(view, cancel))?;
    match &outcome {
        Outcome::Ready((index, _)) => {
            tracing::trace!(index = *index, n = endpoints.len(), "recv_one received")
        }
        Outcome::Cancelled => tracing::trace!(n = endpoints.len(), "recv_one cancelled"),
    }
    Ok(outcome)
}

/// Deliver one value to every endpoint exactly once, in whatever order the
/// receivers show up.
///
/// Each round calls `produce` once and offers the result to the endpoints that
/// have not been served yet. A round lost to cancellation still consumed a
/// produced value, so `produce` runs once per attempt, not once per delivery.
/// Served endpoints keep their index and become inert, so the dispatch tier
/// stays the one picked for the full set.
///
/// On cancellation the partial record is returned with `completed == false`.
/// An empty `endpoints` slice completes immediately without calling `produce`.
///
/// # Errors
///
/// Stops at the first endpoint found disconnected and returns the indices served
/// so far together with the undelivered value.
pub fn send_each<E, F>(
    endpoints: &[Sender<E>],
    mut produce: F,
    cancel: &CancelToken,
) -> Result<Delivery, DeliveryError<E>>
where
    F: FnMut() -> E,
{
    let mut view: Vec<Option<&Sender<E>>> = endpoints.iter().map(Some).collect();
    let mut order = Vec::with_capacity(endpoints.len());

    while order.len() < endpoints.len() {
        match select_send(&view, produce(), cancel) {
            Ok(Outcome::Ready(index)) => {
                order.push(index);
                view[index] = None;
            }
            Ok(Outcome::Cancelled) => {
                tracing::debug!(
                    served = order.len(),
                    n = endpoints.len(),
                    "send_each cancelled"
                );
                return Ok(Delivery {
                    order,
                    completed: false,
                });
            }
            Err(source) => {
                tracing::debug!(
                    index = source.index,
                    served = order.len(),
                    "send_each hit a disconnected endpoint"
                );
                return Err(DeliveryError { order, source });
            }
        }
    }

    tracing::debug!(n = endpoints.len(), "send_each completed");
    Ok(Delivery {
        order,
        completed: true,
    })
}
