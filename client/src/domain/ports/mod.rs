//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod item_transport;

#[cfg(test)]
pub use item_transport::MockItemTransport;
pub use item_transport::{ItemTransport, ReplyBody, TransportError, TransportReply};
