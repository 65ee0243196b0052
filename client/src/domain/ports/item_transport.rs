//! Driven port for exchanging items with the catalogue service.
//!
//! Any response the service produced, whatever its status, comes back as an
//! `Ok` [`TransportReply`]. Only failures that left no response behind are
//! reported as [`TransportError`].

use async_trait::async_trait;
use outcome::ProtocolStatus;

use super::define_port_error;
use crate::domain::item::{Item, ItemId, ItemUpdate, NewItem};
use crate::domain::patch::PatchDocument;

/// Body of a transport reply after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody<T> {
    /// The response carried no content.
    Empty,
    /// The response carried a body that decoded into the expected shape.
    Decoded(T),
    /// The response carried a body that could not be decoded.
    Undecodable {
        /// Decoder diagnostic.
        message: String,
    },
}

/// Response received from the catalogue service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply<T> {
    /// Status reported by the service.
    pub status: ProtocolStatus,
    /// Decoded response body.
    pub body: ReplyBody<T>,
}

impl<T> TransportReply<T> {
    /// Reply with an arbitrary body.
    pub const fn new(status: ProtocolStatus, body: ReplyBody<T>) -> Self {
        Self { status, body }
    }

    /// Reply without content.
    pub const fn empty(status: ProtocolStatus) -> Self {
        Self::new(status, ReplyBody::Empty)
    }

    /// Reply whose body decoded into `body`.
    pub const fn decoded(status: ProtocolStatus, body: T) -> Self {
        Self::new(status, ReplyBody::Decoded(body))
    }

    /// Reply whose body could not be decoded.
    pub fn undecodable(status: ProtocolStatus, message: impl Into<String>) -> Self {
        Self::new(
            status,
            ReplyBody::Undecodable {
                message: message.into(),
            },
        )
    }
}

define_port_error! {
    /// Faults raised before a usable response arrived.
    pub enum TransportError {
        /// The request could not be sent or the response could not be read.
        Connection { message: String, status: Option<u16> } =>
            "item transport connection failed: {message}",
        /// The exchange exceeded its deadline.
        Timeout { message: String } =>
            "item transport timed out: {message}",
        /// The exchange was abandoned before it completed.
        Cancelled { message: String } =>
            "item transport cancelled: {message}",
        /// The request payload could not be encoded.
        Encode { message: String } =>
            "item transport could not encode request: {message}",
    }
}

impl TransportError {
    /// Status code observed before the fault, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Connection { status, .. } => *status,
            Self::Timeout { .. } | Self::Cancelled { .. } | Self::Encode { .. } => None,
        }
    }
}

/// Port for reading and writing items on the catalogue service.
///
/// # Examples
///
/// ```rust,ignore
/// use item_client::domain::ports::ItemTransport;
///
/// let reply = transport.apply_patch(&item.id(), &patch).await?;
/// if reply.status.is_error() {
///     // the service rejected the patch
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemTransport: Send + Sync {
    /// List every item.
    async fn fetch_all(&self) -> Result<TransportReply<Vec<Item>>, TransportError>;

    /// Read one item.
    async fn fetch_one(&self, id: &ItemId) -> Result<TransportReply<Item>, TransportError>;

    /// Create an item; the reply body is the stored item.
    async fn create(&self, item: &NewItem) -> Result<TransportReply<Item>, TransportError>;

    /// Replace every mutable field of an item.
    async fn replace(
        &self,
        id: &ItemId,
        update: &ItemUpdate,
    ) -> Result<TransportReply<()>, TransportError>;

    /// Apply a patch; the reply may or may not carry the patched item.
    async fn apply_patch(
        &self,
        id: &ItemId,
        patch: &PatchDocument,
    ) -> Result<TransportReply<Item>, TransportError>;

    /// Delete an item.
    async fn delete(&self, id: &ItemId) -> Result<TransportReply<()>, TransportError>;
}
