use std::{error::Error, fmt};

const ERR_MSG_ENDPOINT_CLOSED: &str = "endpoint is disconnected";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SendFailReason {
    /// The chosen endpoint has no receiver left.
    Closed,
}

impl fmt::Display for SendFailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendFailReason::Closed => write!(f, "{ERR_MSG_ENDPOINT_CLOSED}"),
        }
    }
}

/// A multiplexed send picked an endpoint that could not take the value.
///
/// Cancellation is not reported here; it is an ordinary outcome.
pub struct SendError<E> {
    /// Index of the endpoint within the set passed to the call.
    pub index: usize,
    /// The value that was not delivered.
    pub value: E,
    pub reason: SendFailReason,
}

impl<E> SendError<E> {
    pub fn closed(index: usize, value: E) -> Self {
        Self {
            index,
            value,
            reason: SendFailReason::Closed,
        }
    }

    /// Recover the undelivered value.
    pub fn into_inner(self) -> E {
        self.value
    }
}

// Manual impl so `E` does not need to be `Debug`.
impl<E> fmt::Debug for SendError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError")
            .field("index", &self.index)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl<E> fmt::Display for SendError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "send on endpoint {} failed: {}", self.index, self.reason)
    }
}

impl<E> Error for SendError<E> {}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RecvError {
    /// The chosen endpoint has no sender left.
    Disconnected { index: usize },
}

impl RecvError {
    pub fn index(&self) -> usize {
        match self {
            RecvError::Disconnected { index } => *index,
        }
    }
}

impl fmt::Display for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecvError::Disconnected { index } => {
                write!(f, "recv on endpoint {index} failed: {ERR_MSG_ENDPOINT_CLOSED}")
            }
        }
    }
}

impl Error for RecvError {}

/// Exhaustive distribution stopped on a disconnected endpoint.
///
/// `order` holds the indices that were served before the failure.
pub struct DeliveryError<E> {
    pub order: Vec<usize>,
    pub source: SendError<E>,
}

impl<E> fmt::Debug for DeliveryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryError")
            .field("order", &self.order)
            .field("source", &self.source)
            .finish()
    }
}

impl<E> fmt::Display for DeliveryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distribution aborted after {} deliveries: {}",
            self.order.len(),
            self.source
        )
    }
}

impl<E: 'static> Error for DeliveryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_endpoint() {
        let err = SendError::closed(3, "payload");
        assert_eq!(err.to_string(), "send on endpoint 3 failed: endpoint is disconnected");
        assert_eq!(err.into_inner(), "payload");

        let err = RecvError::Disconnected { index: 7 };
        assert_eq!(err.index(), 7);
        assert!(err.to_string().contains("endpoint 7"));

        let err = DeliveryError {
            order: vec![1, 0],
            source: SendError::closed(2, 5u8),
        };
        assert!(err.to_string().starts_with("distribution aborted after 2 deliveries"));
        assert!(err.source().is_some());
    }
}
