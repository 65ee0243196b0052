//! Caller-facing item operations with outcome-based error reporting.
//!
//! Every operation performs at most one transport exchange, raced against the
//! caller's cancellation token, and folds whatever happened (decoded reply,
//! rejected request, transport fault, cancellation) into an [`ApiOutcome`].
//! Transport errors never escape this module.
//!
//! Partial updates follow a fixed protocol: diff the two snapshots, skip the
//! exchange when nothing changed, otherwise send the patch and reconcile the
//! reply into one canonical item (see [`PatchResolution`]).

use std::future::Future;
use std::sync::Arc;

use outcome::{ApiOutcome, ProtocolStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::diff::diff;
use super::item::{Item, ItemId, NewItem};
use super::patch::PatchDocument;
use super::ports::{ItemTransport, ReplyBody, TransportError, TransportReply};
use super::status_feed::StatusFeed;

const CANCELLED_BY_CALLER: &str = "operation cancelled by caller";
const EMPTY_BODY: &str = "response body was empty";

/// How a patch exchange was turned into its final item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchResolution {
    /// Nothing changed; no exchange took place and the original is returned.
    ShortCircuit,
    /// The service returned the patched item, which wins.
    ServerBody,
    /// The service accepted the patch without a body; the local copy wins.
    LocalFallback,
    /// The service accepted the patch but its body was unusable; the local
    /// copy wins.
    DegradedFallback,
    /// The patch was rejected, faulted or cancelled.
    Failed,
}

impl PatchResolution {
    /// Stable name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortCircuit => "short_circuit",
            Self::ServerBody => "server_body",
            Self::LocalFallback => "local_fallback",
            Self::DegradedFallback => "degraded_fallback",
            Self::Failed => "failed",
        }
    }
}

/// Result of [`ItemClient::patch_item_with_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Canonical item or failure, as returned by [`ItemClient::patch_item`].
    pub outcome: ApiOutcome<Item>,
    /// Path taken to produce the outcome.
    pub resolution: PatchResolution,
    /// Operations computed by the diff; empty on a short circuit.
    pub operations: PatchDocument,
}

/// Failure settled before the reply body was examined.
struct Rejection {
    message: String,
    status: Option<ProtocolStatus>,
}

fn fault_status(fault: &TransportError) -> Option<ProtocolStatus> {
    fault
        .status()
        .and_then(|code| ProtocolStatus::from_u16(code).ok())
}

async fn race_cancellation<T, F>(
    cancel: &CancellationToken,
    call: F,
) -> Result<TransportReply<T>, TransportError>
where
    F: Future<Output = Result<TransportReply<T>, TransportError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TransportError::cancelled(CANCELLED_BY_CALLER)),
        reply = call => reply,
    }
}

/// Item operations over an [`ItemTransport`].
///
/// The client holds no per-call state; clones share the transport and the
/// optional status feed.
///
/// # Examples
///
/// ```rust,ignore
/// use tokio_util::sync::CancellationToken;
///
/// let client = ItemClient::new(transport).with_status_feed(feed.clone());
/// let outcome = client.patch_item(&original, &edited, &CancellationToken::new()).await;
/// if outcome.is_success() {
///     original = outcome.into_value();
/// }
/// ```
#[derive(Clone)]
pub struct ItemClient {
    transport: Arc<dyn ItemTransport>,
    status_feed: Option<StatusFeed>,
}

impl ItemClient {
    /// Create a client over `transport`.
    pub fn new(transport: Arc<dyn ItemTransport>) -> Self {
        Self {
            transport,
            status_feed: None,
        }
    }

    /// Publish one message per finished operation to `feed`.
    pub fn with_status_feed(mut self, feed: StatusFeed) -> Self {
        self.status_feed = Some(feed);
        self
    }

    /// List every item.
    pub async fn get_items(&self, cancel: &CancellationToken) -> ApiOutcome<Vec<Item>> {
        let reply = self
            .exchange(
                "get_items",
                cancel,
                self.transport.fetch_all(),
                |fault| format!("Exception retrieving Items from the Server, Message=\"{fault}\""),
                |_| "Error Getting Items from the Server".to_owned(),
            )
            .await;
        let (status, body) = match reply {
            Ok(reply) => reply,
            Err(rejection) => return self.reject(rejection),
        };

        let detail = match body {
            ReplyBody::Decoded(items) => {
                info!(count = items.len(), %status, "items listed");
                let summary = format!("Loaded {} items", items.len());
                return self.succeed(items, status, summary);
            }
            ReplyBody::Empty => EMPTY_BODY.to_owned(),
            ReplyBody::Undecodable { message } => message,
        };
        self.undecodable("get_items", status, &detail, |detail| {
            format!("Cannot deserialize response to item list (status {status}): {detail}")
        })
    }

    /// Read one item.
    pub async fn get_item(&self, id: ItemId, cancel: &CancellationToken) -> ApiOutcome<Item> {
        let reply = self
            .exchange(
                "get_item",
                cancel,
                self.transport.fetch_one(&id),
                |fault| format!("Exception retrieving Item {id}, Message=\"{fault}\""),
                |status| {
                    if status == ProtocolStatus::NOT_FOUND {
                        format!("Item {id} was not found on the Server")
                    } else {
                        format!("Error Getting Item {id} from the Server")
                    }
                },
            )
            .await;
        let (status, body) = match reply {
            Ok(reply) => reply,
            Err(rejection) => return self.reject(rejection),
        };

        let detail = match body {
            ReplyBody::Decoded(item) => {
                info!(item_id = %id, %status, "item fetched");
                let summary = format!("Loaded Item \"{}\"", item.name());
                return self.succeed(item, status, summary);
            }
            ReplyBody::Empty => EMPTY_BODY.to_owned(),
            ReplyBody::Undecodable { message } => message,
        };
        self.undecodable("get_item", status, &detail, |detail| {
            format!("Error deserializing Item {id} (status {status}): {detail}")
        })
    }

    /// Create an item and return the stored copy.
    pub async fn create_item(&self, item: &NewItem, cancel: &CancellationToken) -> ApiOutcome<Item> {
        let name = item.name.as_str();
        let reply = self
            .exchange(
                "create_item",
                cancel,
                self.transport.create(item),
                |fault| format!("Exception creating Item \"{name}\", Message=\"{fault}\""),
                |_| format!("Error creating Item \"{name}\""),
            )
            .await;
        let (status, body) = match reply {
            Ok(reply) => reply,
            Err(rejection) => return self.reject(rejection),
        };

        let detail = match body {
            ReplyBody::Decoded(created) => {
                info!(
                    item_id = %created.id(),
                    created_date = %created.created_date(),
                    %status,
                    "item created"
                );
                let summary = format!("Created Item \"{}\"", created.name());
                return self.succeed(created, status, summary);
            }
            ReplyBody::Empty => EMPTY_BODY.to_owned(),
            ReplyBody::Undecodable { message } => message,
        };
        self.undecodable("create_item", status, &detail, |detail| {
            format!("Error deserializing Item \"{name}\" (status {status}): {detail}")
        })
    }

    /// Replace every mutable field of `item` on the service.
    ///
    /// On success the submitted snapshot is returned unchanged.
    pub async fn update_item(&self, item: &Item, cancel: &CancellationToken) -> ApiOutcome<Item> {
        let (id, name) = (item.id(), item.name());
        let update = item.to_update();
        let reply = self
            .exchange(
                "update_item",
                cancel,
                self.transport.replace(&id, &update),
                |fault| format!("Exception updating Item \"{name}\" at items/{id}, Message=\"{fault}\""),
                |_| format!("Error Putting Item \"{name}\" at items/{id}"),
            )
            .await;
        match reply {
            Ok((status, _)) => {
                info!(item_id = %id, %status, "item replaced");
                self.succeed(item.clone(), status, format!("Updated Item \"{name}\""))
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    /// Send the changes between two snapshots of one item and return the
    /// canonical result.
    ///
    /// # Panics
    ///
    /// Panics when `original` and `modified` have different ids; nothing is
    /// sent in that case.
    pub async fn patch_item(
        &self,
        original: &Item,
        modified: &Item,
        cancel: &CancellationToken,
    ) -> ApiOutcome<Item> {
        self.patch_item_with_report(original, modified, cancel)
            .await
            .outcome
    }

    /// [`ItemClient::patch_item`], also reporting how the outcome was reached.
    ///
    /// # Panics
    ///
    /// Panics when `original` and `modified` have different ids.
    pub async fn patch_item_with_report(
        &self,
        original: &Item,
        modified: &Item,
        cancel: &CancellationToken,
    ) -> PatchReport {
        let operations = diff(original, modified);
        let id = original.id();
        if operations.is_empty() {
            debug!(item_id = %id, "patch skipped: snapshots are identical");
            let summary = format!("Item \"{}\" unchanged", original.name());
            return PatchReport {
                outcome: self.succeed(original.clone(), ProtocolStatus::UNUSED, summary),
                resolution: PatchResolution::ShortCircuit,
                operations,
            };
        }

        let name = modified.name();
        debug!(item_id = %id, fields = ?operations.fields(), "sending item patch");
        let reply = self
            .exchange(
                "patch_item",
                cancel,
                self.transport.apply_patch(&id, &operations),
                |fault| format!("Exception patching Item \"{name}\" at items/{id}, Message=\"{fault}\""),
                |_| format!("Error patching Item \"{name}\" at items/{id}"),
            )
            .await;
        let (status, body) = match reply {
            Ok(reply) => reply,
            Err(rejection) => {
                return PatchReport {
                    outcome: self.reject(rejection),
                    resolution: PatchResolution::Failed,
                    operations,
                };
            }
        };

        let (item, resolution) = match body {
            ReplyBody::Decoded(item) if item.id() == id => {
                info!(item_id = %id, %status, resolution = PatchResolution::ServerBody.as_str(), "item patched");
                (item, PatchResolution::ServerBody)
            }
            ReplyBody::Decoded(item) => {
                warn!(
                    item_id = %id,
                    reply_item_id = %item.id(),
                    %status,
                    resolution = PatchResolution::DegradedFallback.as_str(),
                    "patch reply described another item; keeping local copy"
                );
                (modified.clone(), PatchResolution::DegradedFallback)
            }
            ReplyBody::Empty => {
                info!(item_id = %id, %status, resolution = PatchResolution::LocalFallback.as_str(), "item patched");
                (modified.clone(), PatchResolution::LocalFallback)
            }
            ReplyBody::Undecodable { message } => {
                warn!(
                    item_id = %id,
                    %status,
                    error = %message,
                    resolution = PatchResolution::DegradedFallback.as_str(),
                    "patch reply body undecodable; keeping local copy"
                );
                (modified.clone(), PatchResolution::DegradedFallback)
            }
        };

        let summary = format!("Patched Item \"{}\"", item.name());
        PatchReport {
            outcome: self.succeed(item, status, summary),
            resolution,
            operations,
        }
    }

    /// Delete `item` and return it.
    pub async fn delete_item(&self, item: &Item, cancel: &CancellationToken) -> ApiOutcome<Item> {
        let (id, name) = (item.id(), item.name());
        let reply = self
            .exchange(
                "delete_item",
                cancel,
                self.transport.delete(&id),
                |fault| format!("Exception deleting Item \"{name}\" with Id {id}, Message=\"{fault}\""),
                |_| format!("Error deleting Item \"{name}\" ({id})"),
            )
            .await;
        match reply {
            Ok((status, _)) => {
                info!(item_id = %id, %status, "item deleted");
                self.succeed(item.clone(), status, format!("Deleted Item \"{name}\""))
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    /// Run one transport call and settle faults and rejected requests.
    ///
    /// Returns the status and body of a reply the service accepted; anything
    /// else is logged once and returned as a [`Rejection`].
    async fn exchange<T, F>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        call: F,
        fault_message: impl FnOnce(&TransportError) -> String,
        rejected_message: impl FnOnce(ProtocolStatus) -> String,
    ) -> Result<(ProtocolStatus, ReplyBody<T>), Rejection>
    where
        F: Future<Output = Result<TransportReply<T>, TransportError>>,
    {
        match race_cancellation(cancel, call).await {
            Ok(reply) if reply.status.is_error() => {
                error!(operation, status = %reply.status, "request rejected by the service");
                Err(Rejection {
                    message: rejected_message(reply.status),
                    status: Some(reply.status),
                })
            }
            Ok(reply) => Ok((reply.status, reply.body)),
            Err(fault) => {
                error!(
                    operation,
                    kind = fault.kind(),
                    error = %fault,
                    "request failed before a response arrived"
                );
                Err(Rejection {
                    message: fault_message(&fault),
                    status: fault_status(&fault),
                })
            }
        }
    }

    fn undecodable<T>(
        &self,
        operation: &'static str,
        status: ProtocolStatus,
        detail: &str,
        message: impl FnOnce(&str) -> String,
    ) -> ApiOutcome<T> {
        error!(operation, %status, error = %detail, "response body could not be used");
        self.reject(Rejection {
            message: message(detail),
            status: None,
        })
    }

    fn succeed<T>(&self, value: T, status: ProtocolStatus, summary: String) -> ApiOutcome<T> {
        self.publish(summary);
        ApiOutcome::success(value, status)
    }

    /// Fail with `rejection`; statuses outside the error range are reported
    /// as the unused sentinel.
    fn reject<T>(&self, rejection: Rejection) -> ApiOutcome<T> {
        let Rejection { message, status } = rejection;
        self.publish(message.clone());
        ApiOutcome::fail(message, status.filter(|status| status.is_error()))
    }

    fn publish(&self, message: String) {
        if let Some(feed) = &self.status_feed {
            feed.publish(message);
        }
    }
}

#[cfg(test)]
#[path = "item_client_tests.rs"]
mod tests;
