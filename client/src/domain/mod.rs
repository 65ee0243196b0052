//! Domain primitives and services for the item catalogue client.
//!
//! Purpose: define the item entity and the partial-update protocol that turns
//! two snapshots of one item into a patch, sends it through the
//! [`ports::ItemTransport`] port and reconciles the reply into one canonical
//! item.
//!
//! Public surface:
//! - Item (alias to `item::Item`) — validated entity snapshot.
//! - PatchDocument (alias to `patch::PatchDocument`) — ordered replace
//!   operations, serialised as a JSON patch.
//! - diff / try_diff — minimal patch between two snapshots.
//! - ItemClient — caller-facing operations returning `ApiOutcome` values.
//! - StatusFeed — latest human-readable status, broadcast to subscribers.

pub mod diff;
pub mod item;
pub mod item_client;
pub mod patch;
pub mod ports;
pub mod status_feed;

pub use self::diff::{DiffError, diff, try_diff};
pub use self::item::{
    ITEM_DESCRIPTION_MAX, ITEM_NAME_MAX, ITEM_PRICE_MAX, ITEM_PRICE_MIN, Item, ItemId, ItemUpdate,
    ItemValidationError, NewItem,
};
pub use self::item_client::{ItemClient, PatchReport, PatchResolution};
pub use self::patch::{
    ItemField, PatchApplyError, PatchDocument, PatchOpKind, PatchOperation, PatchValue,
};
pub use self::status_feed::StatusFeed;
