//! Descriptor registry: endpoints and their readiness-wait slots

pub mod channel;
pub mod endpoint;
pub mod interest;
pub mod table;

pub use channel::{Channel, InputHandle};
pub use endpoint::{Endpoint, EndpointRole};
pub use interest::{Readiness, WaitInterest};
pub use table::{Identity, Registry, Rejection};
