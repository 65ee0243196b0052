//! Field-level patch operations and their JSON patch wire format.
//!
//! A [`PatchDocument`] serialises as a JSON patch array:
//! `[{"op":"replace","path":"/Name","value":"B"}]`. Only the mutable item
//! fields have an [`ItemField`], so identity and creation date cannot be
//! addressed by a patch.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::{Item, ItemValidationError};

/// Patchable item field, in the fixed order used by the diff generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemField {
    /// The item name, addressed as `/Name`.
    #[serde(rename = "/Name")]
    Name,
    /// The item description, addressed as `/Description`.
    #[serde(rename = "/Description")]
    Description,
    /// The item price, addressed as `/Price`.
    #[serde(rename = "/Price")]
    Price,
}

impl ItemField {
    /// Every patchable field in comparison order.
    pub const ALL: [Self; 3] = [Self::Name, Self::Description, Self::Price];

    /// JSON pointer addressing this field.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Name => "/Name",
            Self::Description => "/Description",
            Self::Price => "/Price",
        }
    }

    /// Current value of this field on `item`.
    pub fn value_of(self, item: &Item) -> PatchValue {
        match self {
            Self::Name => PatchValue::Text(item.name().to_owned()),
            Self::Description => PatchValue::Text(item.description().to_owned()),
            Self::Price => PatchValue::Amount(item.price()),
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// New value carried by a patch operation.
///
/// Text serialises as a JSON string and amounts as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    /// Value for a text field.
    Text(String),
    /// Value for a monetary field.
    Amount(Decimal),
}

/// Patch verb. Only replacement is produced or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpKind {
    /// Overwrite the addressed field.
    Replace,
}

/// One `replace` of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    op: PatchOpKind,
    path: ItemField,
    value: PatchValue,
}

impl PatchOperation {
    /// Build a `replace` operation for `field`.
    pub const fn replace(field: ItemField, value: PatchValue) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path: field,
            value,
        }
    }

    /// Field addressed by the operation.
    pub const fn field(&self) -> ItemField {
        self.path
    }

    /// New value for the field.
    pub const fn value(&self) -> &PatchValue {
        &self.value
    }
}

/// Errors raised while applying a patch to an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchApplyError {
    /// The value kind does not fit the addressed field.
    #[error("value for {field} has the wrong type")]
    ValueKindMismatch {
        /// Field whose value was rejected.
        field: ItemField,
    },
    /// The patched item violates a field limit.
    #[error("patched item is invalid: {0}")]
    Validation(#[from] ItemValidationError),
}

/// Ordered sequence of field replacements for one item.
///
/// # Examples
/// ```
/// use item_client::domain::{ItemField, PatchDocument, PatchOperation, PatchValue};
///
/// let patch: PatchDocument = [PatchOperation::replace(
///     ItemField::Name,
///     PatchValue::Text("B".to_owned()),
/// )]
/// .into_iter()
/// .collect();
/// let json = serde_json::to_string(&patch).expect("serialisable");
/// assert_eq!(json, r#"[{"op":"replace","path":"/Name","value":"B"}]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(Vec<PatchOperation>);

impl PatchDocument {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the operations in order.
    pub fn operations(&self) -> &[PatchOperation] {
        self.0.as_slice()
    }

    /// Iterate the operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.0.iter()
    }

    /// Fields touched by the patch, in order.
    pub fn fields(&self) -> Vec<ItemField> {
        self.iter().map(PatchOperation::field).collect()
    }

    /// Apply every operation in order to a copy of `item`.
    ///
    /// The input is left untouched; the first failing operation aborts the
    /// whole patch.
    pub fn apply_to(&self, item: &Item) -> Result<Item, PatchApplyError> {
        let mut patched = item.clone();
        for operation in &self.0 {
            match (operation.path, &operation.value) {
                (ItemField::Name, PatchValue::Text(name)) => patched.set_name(name.as_str())?,
                (ItemField::Description, PatchValue::Text(description)) => {
                    patched.set_description(description.as_str())?;
                }
                (ItemField::Price, PatchValue::Amount(price)) => patched.set_price(*price)?,
                (field, _) => return Err(PatchApplyError::ValueKindMismatch { field }),
            }
        }
        Ok(patched)
    }
}

impl FromIterator<PatchOperation> for PatchDocument {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PatchDocument {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatchDocument {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
