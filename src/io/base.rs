use crossbeam::channel::{self as cbchan, Receiver, Sender};
use std::fmt;
use std::ops::Deref;

/// Direction of an endpoint as seen by the caller of the multiplexer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Send,
    Recv,
}

mod sealed {
    pub trait Sealed {}
    impl<E> Sealed for crossbeam::channel::Sender<E> {}
    impl<E> Sealed for crossbeam::channel::Receiver<E> {}
}

/// Marker trait for one-directional channel halves that can take part in a
/// multiplexed wait.
pub trait Endpoint: sealed::Sealed {
    /// Element type carried by this endpoint.
    type Item;

    const DIRECTION: Direction;
}

impl<E> Endpoint for Sender<E> {
    type Item = E;
    const DIRECTION: Direction = Direction::Send;
}

impl<E> Endpoint for Receiver<E> {
    type Item = E;
    const DIRECTION: Direction = Direction::Recv;
}

/// Ordered, fixed-length, non-empty set of same-direction endpoints.
///
/// The position of an endpoint is its identity: every index reported by
/// [`send_one`](crate::io::oneof::send_one), [`recv_one`](crate::io::oneof::recv_one)
/// and [`send_each`](crate::io::oneof::send_each) refers to it. The set derefs to a
/// slice, so it can be passed wherever `&[Sender<E>]` or `&[Receiver<E>]` is taken.
#[derive(Clone)]
pub struct EndpointSet<C: Endpoint> {
    endpoints: Vec<C>,
}

pub type SendSet<E> = EndpointSet<Sender<E>>;
pub type RecvSet<E> = EndpointSet<Receiver<E>>;

impl<C: Endpoint> EndpointSet<C> {
    /// Wrap `endpoints` in a set.
    ///
    /// # Panics
    ///
    /// Panics if `endpoints` is empty.
    pub fn new(endpoints: Vec<C>) -> Self {
        assert!(!endpoints.is_empty(), "endpoint set must not be empty");
        Self { endpoints }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        C::DIRECTION
    }

    #[inline]
    pub fn as_slice(&self) -> &[C] {
        &self.endpoints
    }

    pub fn into_inner(self) -> Vec<C> {
        self.endpoints
    }
}

impl<C: Endpoint> Deref for EndpointSet<C> {
    type Target = [C];

    fn deref(&self) -> &[C] {
        &self.endpoints
    }
}

impl<C: Endpoint> AsRef<[C]> for EndpointSet<C> {
    fn as_ref(&self) -> &[C] {
        &self.endpoints
    }
}

impl<C: Endpoint> FromIterator<C> for EndpointSet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<C: Endpoint> fmt::Debug for EndpointSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointSet")
            .field("direction", &C::DIRECTION)
            .field("len", &self.endpoints.len())
            .finish()
    }
}

/// Create `n` zero-capacity channels and split them into a send set and a
/// receive set. Index `i` of both sets refers to the same channel.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn rendezvous<E>(n: usize) -> (SendSet<E>, RecvSet<E>) {
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..n).map(|_| cbchan::bounded(0)).unzip();
    (EndpointSet::new(senders), EndpointSet::new(receivers))
}
