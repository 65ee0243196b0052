//! DTOs for the catalogue service's camelCase JSON payloads.
//!
//! Replies decode into these transport DTOs first, then map into domain items
//! in one pass.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Item, ItemId, ItemUpdate, NewItem};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ItemDto {
    pub(super) id: Uuid,
    pub(super) name: String,
    #[serde(default)]
    pub(super) description: String,
    pub(super) price: Decimal,
    pub(super) created_date: DateTime<Utc>,
}

impl ItemDto {
    /// Map into a domain item; prices are truncated to whole units.
    pub(super) fn into_domain(self) -> Result<Item, String> {
        let id = self.id;
        Item::new(
            ItemId::from_uuid(id),
            self.name,
            self.description,
            self.price.trunc(),
            self.created_date,
        )
        .map_err(|error| format!("item {id} is invalid: {error}"))
    }
}

pub(super) fn into_domain_items(items: Vec<ItemDto>) -> Result<Vec<Item>, String> {
    items.into_iter().map(ItemDto::into_domain).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewItemDto<'a> {
    pub(super) name: &'a str,
    pub(super) description: &'a str,
    pub(super) price: Decimal,
}

impl<'a> From<&'a NewItem> for NewItemDto<'a> {
    fn from(value: &'a NewItem) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_str(),
            price: value.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ItemUpdateDto<'a> {
    pub(super) id: Uuid,
    pub(super) name: &'a str,
    pub(super) description: &'a str,
    pub(super) price: Decimal,
}

impl<'a> ItemUpdateDto<'a> {
    pub(super) fn new(id: ItemId, update: &'a ItemUpdate) -> Self {
        Self {
            id: *id.as_uuid(),
            name: update.name.as_str(),
            description: update.description.as_str(),
            price: update.price,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Mapping rules between wire DTOs and domain items.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn decodes_camel_case_items_and_truncates_prices() {
        let raw = json!({
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "name": "Lamp",
            "description": "Desk lamp",
            "price": 19.99,
            "createdDate": "2024-03-01T12:00:00+02:00",
        });

        let dto: ItemDto = serde_json::from_value(raw).expect("valid dto");
        let item = dto.into_domain().expect("valid item");

        assert_eq!(item.id().to_string(), "3f2504e0-4f89-11d3-9a0c-0305e82c3301");
        assert_eq!(item.price(), Decimal::from(19));
        assert_eq!(item.created_date().to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[rstest]
    fn missing_description_defaults_to_empty() {
        let raw = json!({
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "name": "Lamp",
            "price": 5,
            "createdDate": "2024-03-01T12:00:00Z",
        });

        let dto: ItemDto = serde_json::from_value(raw).expect("valid dto");
        assert_eq!(dto.into_domain().expect("valid item").description(), "");
    }

    #[rstest]
    fn out_of_range_items_are_rejected_with_their_id() {
        let raw = json!({
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "name": "Lamp",
            "price": 2500,
            "createdDate": "2024-03-01T12:00:00Z",
        });

        let dto: ItemDto = serde_json::from_value(raw).expect("valid dto");
        let error = dto.into_domain().expect_err("price above limit");
        assert!(error.starts_with("item 3f2504e0-4f89-11d3-9a0c-0305e82c3301 is invalid"));
    }

    #[rstest]
    fn update_payload_carries_id_and_camel_case_fields() {
        let update = ItemUpdate {
            name: "Lamp".to_owned(),
            description: String::new(),
            price: Decimal::from(7),
        };
        let id: ItemId = "3f2504e0-4f89-11d3-9a0c-0305e82c3301"
            .parse()
            .expect("valid id");

        let value = serde_json::to_value(ItemUpdateDto::new(id, &update)).expect("serialisable");
        assert_eq!(
            value,
            json!({
                "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
                "name": "Lamp",
                "description": "",
                "price": 7.0,
            })
        );
    }
}
