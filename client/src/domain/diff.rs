//! Minimal field-level diff between two snapshots of one item.

use thiserror::Error;

use super::item::{Item, ItemId};
use super::patch::{ItemField, PatchDocument, PatchOperation};

/// Errors raised by [`try_diff`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The snapshots describe different items.
    #[error("cannot diff item {original} against item {modified}: identities differ")]
    IdentityMismatch {
        /// Identity of the original snapshot.
        original: ItemId,
        /// Identity of the modified snapshot.
        modified: ItemId,
    },
}

/// Compute the replace operations that turn `original` into `modified`.
///
/// Fields are compared in [`ItemField::ALL`] order and only differing fields
/// produce an operation, so equal snapshots yield an empty patch.
///
/// # Errors
///
/// Returns [`DiffError::IdentityMismatch`] when the snapshots have different
/// ids.
pub fn try_diff(original: &Item, modified: &Item) -> Result<PatchDocument, DiffError> {
    if original.id() != modified.id() {
        return Err(DiffError::IdentityMismatch {
            original: original.id(),
            modified: modified.id(),
        });
    }

    Ok(ItemField::ALL
        .into_iter()
        .filter_map(|field| {
            let after = field.value_of(modified);
            (field.value_of(original) != after).then(|| PatchOperation::replace(field, after))
        })
        .collect())
}

/// Infallible form of [`try_diff`] for callers that already hold two
/// snapshots of the same item.
///
/// # Panics
///
/// Panics when the snapshots have different ids.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use item_client::domain::{ItemField, Item, ItemId, diff};
/// use rust_decimal::Decimal;
///
/// let original = Item::new(ItemId::random(), "A", "", Decimal::from(10), Utc::now())
///     .expect("valid item");
/// let mut modified = original.clone();
/// modified.set_name("B").expect("valid name");
///
/// assert_eq!(diff(&original, &modified).fields(), vec![ItemField::Name]);
/// assert!(diff(&original, &original).is_empty());
/// ```
pub fn diff(original: &Item, modified: &Item) -> PatchDocument {
    match try_diff(original, modified) {
        Ok(patch) => patch,
        Err(err) => panic!("{err}"),
    }
}
