//! Live fan-out: the connection registry, per-connection state, and the
//! track/untrack delivery protocol.

pub mod client;
pub mod dispatcher;
pub mod protocol;
pub mod session;
pub mod subscriptions;

pub use client::{LiveClient, Outbound};
pub use dispatcher::Dispatcher;
pub use protocol::{BAD_REQUEST, ControlMessage, DeliveryFrame, ReadingFrame};
pub use subscriptions::Subscriptions;
