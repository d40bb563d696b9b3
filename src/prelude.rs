pub use crate::error::{DeliveryError, RecvError, SendError, SendFailReason};
pub use crate::io::base::{Direction, Endpoint, EndpointSet, RecvSet, SendSet, rendezvous};
pub use crate::io::oneof::{Delivery, recv_one, send_each, send_one};
pub use crate::io::select::Outcome;
pub use crate::io::tier::Tier;
pub use crate::utils::{CancelGuard, CancelToken};
