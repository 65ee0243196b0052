//! Item entity snapshots and the payloads derived from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed length, in characters, of an item name.
pub const ITEM_NAME_MAX: usize = 64;
/// Maximum allowed length, in characters, of an item description.
pub const ITEM_DESCRIPTION_MAX: usize = 512;
/// Lowest accepted item price.
pub const ITEM_PRICE_MIN: Decimal = Decimal::ZERO;
/// Highest accepted item price.
pub const ITEM_PRICE_MAX: Decimal = Decimal::ONE_THOUSAND;

/// Validation errors returned when building or mutating an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NameTooLong { max: usize, actual: usize },
    DescriptionTooLong { max: usize, actual: usize },
    PriceOutOfRange { min: Decimal, max: Decimal, actual: Decimal },
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooLong { max, actual } => {
                write!(f, "item name must be at most {max} characters (got {actual})")
            }
            Self::DescriptionTooLong { max, actual } => write!(
                f,
                "item description must be at most {max} characters (got {actual})"
            ),
            Self::PriceOutOfRange { min, max, actual } => {
                write!(f, "item price must be between {min} and {max} (got {actual})")
            }
        }
    }
}

impl std::error::Error for ItemValidationError {}

/// Stable item identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`ItemId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ItemId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn validate_name(name: &str) -> Result<(), ItemValidationError> {
    let actual = name.chars().count();
    if actual > ITEM_NAME_MAX {
        return Err(ItemValidationError::NameTooLong {
            max: ITEM_NAME_MAX,
            actual,
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ItemValidationError> {
    let actual = description.chars().count();
    if actual > ITEM_DESCRIPTION_MAX {
        return Err(ItemValidationError::DescriptionTooLong {
            max: ITEM_DESCRIPTION_MAX,
            actual,
        });
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ItemValidationError> {
    if !(ITEM_PRICE_MIN..=ITEM_PRICE_MAX).contains(&price) {
        return Err(ItemValidationError::PriceOutOfRange {
            min: ITEM_PRICE_MIN,
            max: ITEM_PRICE_MAX,
            actual: price,
        });
    }
    Ok(())
}

/// Snapshot of one catalogue item.
///
/// ## Invariants
/// - `id` and `created_date` never change after construction;
/// - `name`, `description` and `price` always satisfy the length and range
///   limits, including after a setter call.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use item_client::domain::{Item, ItemId};
/// use rust_decimal::Decimal;
///
/// let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
/// let mut item = Item::new(ItemId::random(), "Lamp", "Desk lamp", Decimal::from(25), created)
///     .expect("valid item");
/// item.set_name("Floor lamp").expect("valid name");
/// assert_eq!(item.name(), "Floor lamp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    description: String,
    price: Decimal,
    created_date: DateTime<Utc>,
}

impl Item {
    /// Validate and build an item snapshot.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        created_date: DateTime<Utc>,
    ) -> Result<Self, ItemValidationError> {
        let name = name.into();
        let description = description.into();
        validate_name(&name)?;
        validate_description(&description)?;
        validate_price(price)?;
        Ok(Self {
            id,
            name,
            description,
            price,
            created_date,
        })
    }

    /// Build the item a store would hold after accepting `payload`.
    pub fn from_new(
        id: ItemId,
        payload: &NewItem,
        created_date: DateTime<Utc>,
    ) -> Result<Self, ItemValidationError> {
        Self::new(
            id,
            payload.name.clone(),
            payload.description.clone(),
            payload.price,
            created_date,
        )
    }

    /// Item identifier.
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Item name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Item description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Item price.
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Timestamp assigned when the item was created.
    pub const fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Replace the name, keeping the old value when validation fails.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ItemValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Replace the description, keeping the old value when validation fails.
    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<(), ItemValidationError> {
        let description = description.into();
        validate_description(&description)?;
        self.description = description;
        Ok(())
    }

    /// Replace the price, keeping the old value when validation fails.
    pub fn set_price(&mut self, price: Decimal) -> Result<(), ItemValidationError> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }

    /// Apply every field of a full replacement.
    ///
    /// All fields are validated before any is written.
    pub fn apply_update(&mut self, update: &ItemUpdate) -> Result<(), ItemValidationError> {
        validate_name(&update.name)?;
        validate_description(&update.description)?;
        validate_price(update.price)?;
        self.name.clone_from(&update.name);
        self.description.clone_from(&update.description);
        self.price = update.price;
        Ok(())
    }

    /// Full-replacement payload carrying this snapshot's mutable fields.
    pub fn to_update(&self) -> ItemUpdate {
        ItemUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
        }
    }
}

/// Payload for creating an item; the store assigns id and creation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Item price.
    pub price: Decimal,
}

impl NewItem {
    /// Build a create payload.
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// Payload for replacing every mutable field of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Item price.
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn item() -> Item {
        let created = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        Item::new(ItemId::random(), "Kettle", "Steel kettle", Decimal::from(30), created)
            .expect("valid item")
    }

    #[rstest]
    #[case::name_too_long("n".repeat(65), "d".to_owned(), Decimal::ONE)]
    #[case::description_too_long("n".to_owned(), "d".repeat(513), Decimal::ONE)]
    #[case::negative_price("n".to_owned(), "d".to_owned(), Decimal::NEGATIVE_ONE)]
    #[case::price_above_limit("n".to_owned(), "d".to_owned(), Decimal::new(100_001, 2))]
    fn new_rejects_out_of_range_fields(
        #[case] name: String,
        #[case] description: String,
        #[case] price: Decimal,
    ) {
        let result = Item::new(ItemId::random(), name, description, price, Utc::now());
        assert!(result.is_err());
    }

    #[rstest]
    fn limits_are_inclusive() {
        let item = Item::new(
            ItemId::random(),
            "n".repeat(ITEM_NAME_MAX),
            "d".repeat(ITEM_DESCRIPTION_MAX),
            ITEM_PRICE_MAX,
            Utc::now(),
        );
        assert!(item.is_ok());
    }

    #[rstest]
    fn name_length_counts_characters_not_bytes() {
        let name = "é".repeat(ITEM_NAME_MAX);
        assert!(Item::new(ItemId::random(), name, "", Decimal::ZERO, Utc::now()).is_ok());
    }

    #[rstest]
    fn failed_setter_keeps_previous_value(mut item: Item) {
        let err = item
            .set_price(Decimal::from(5000))
            .expect_err("price above limit");
        assert_eq!(
            err.to_string(),
            "item price must be between 0 and 1000 (got 5000)"
        );
        assert_eq!(item.price(), Decimal::from(30));
    }

    #[rstest]
    fn apply_update_is_all_or_nothing(mut item: Item) {
        let update = ItemUpdate {
            name: "Teapot".to_owned(),
            description: "d".repeat(ITEM_DESCRIPTION_MAX + 1),
            price: Decimal::from(12),
        };
        assert!(matches!(
            item.apply_update(&update),
            Err(ItemValidationError::DescriptionTooLong { .. })
        ));
        assert_eq!(item.name(), "Kettle");
        assert_eq!(item.price(), Decimal::from(30));
    }

    #[rstest]
    fn to_update_round_trips_through_apply_update(item: Item) {
        let mut copy = item.clone();
        copy.apply_update(&item.to_update()).expect("valid update");
        assert_eq!(copy, item);
    }

    #[rstest]
    fn item_id_parses_and_displays_hyphenated_uuids() {
        let raw = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";
        let id: ItemId = raw.parse().expect("valid uuid");
        assert_eq!(id.to_string(), raw);
        assert!("not-a-uuid".parse::<ItemId>().is_err());
    }
}
