use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;

/// Client-submitted candidate for a create or a full-replace update.
///
/// Carries only user-managed fields: the store assigns the identifier and
/// the timestamps. `sku` and `name` default to empty when missing so that the
/// validator, not the decoder, reports them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "price_CAD", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl ItemDraft {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// A stored inventory item.
///
/// Timestamps never leave the process: they are skipped by serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "price_CAD", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub quantity: i64,
    #[serde(skip)]
    pub date_added: DateTime<Utc>,
    #[serde(skip)]
    pub last_updated: DateTime<Utc>,
}

impl Item {
    /// Materialize a validated draft as a newly-created item.
    pub fn create(id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> Self {
        Self {
            id,
            sku: draft.sku,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            quantity: draft.quantity.unwrap_or(0),
            date_added: at,
            last_updated: at,
        }
    }

    /// Full replace of the user-managed fields. Identifier and `date_added` are kept.
    ///
    /// `last_updated` never moves before `date_added`, even if the clock does.
    pub fn replace(&mut self, draft: ItemDraft, at: DateTime<Utc>) {
        self.sku = draft.sku;
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.quantity = draft.quantity.unwrap_or(0);
        self.last_updated = at.max(self.date_added);
    }

    /// The user-managed fields of this item, as a draft.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            sku: self.sku.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: Some(self.quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn create_defaults_quantity_and_stamps_both_timestamps() {
        let item = Item::create(ItemId::generate(), ItemDraft::new("01234567", "Thing1"), t0());
        assert_eq!(item.quantity, 0);
        assert_eq!(item.date_added, t0());
        assert_eq!(item.last_updated, item.date_added);
    }

    #[test]
    fn replace_is_a_full_replace() {
        let draft = ItemDraft::new("AAAAAAAA", "Thing1")
            .with_description("blue")
            .with_price(9.99)
            .with_quantity(4);
        let mut item = Item::create(ItemId::generate(), draft, t0());
        let id = item.id.clone();

        item.replace(ItemDraft::new("BBBBBBBB", "Thing2"), t0() + Duration::days(1));

        assert_eq!(item.id, id);
        assert_eq!(item.sku, "BBBBBBBB");
        assert_eq!(item.description, "");
        assert_eq!(item.price, None);
        assert_eq!(item.quantity, 0);
        assert_eq!(item.date_added, t0());
        assert_eq!(item.last_updated, t0() + Duration::days(1));
    }

    #[test]
    fn replace_never_moves_last_updated_before_date_added() {
        let mut item = Item::create(ItemId::generate(), ItemDraft::new("AAAA", "x"), t0());
        item.replace(ItemDraft::new("AAAA", "y"), t0() - Duration::days(3));
        assert_eq!(item.last_updated, t0());
    }

    #[test]
    fn serialization_is_sparse_and_hides_timestamps() {
        let id = ItemId::parse("c0ffee0000000000beef").unwrap();
        let item = Item::create(id, ItemDraft::new("01234567", "Thing1"), t0());

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "c0ffee0000000000beef",
                "sku": "01234567",
                "name": "Thing1",
                "quantity": 0,
            })
        );
    }

    #[test]
    fn serialization_includes_present_optionals() {
        let draft = ItemDraft::new("01234567", "Thing1")
            .with_description("desc")
            .with_price(0.0)
            .with_quantity(3);
        let item = Item::create(ItemId::generate(), draft, t0());

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["description"], "desc");
        assert_eq!(value["price_CAD"], 0.0);
        assert_eq!(value["quantity"], 3);
        assert!(value.get("date_added").is_none());
    }

    #[test]
    fn draft_decodes_missing_fields_as_absent() {
        let draft: ItemDraft = serde_json::from_value(json!({ "name": "Thing1" })).unwrap();
        assert_eq!(draft.sku, "");
        assert_eq!(draft.price, None);
        assert_eq!(draft.quantity, None);

        let draft: ItemDraft =
            serde_json::from_value(json!({ "sku": "AAAA", "name": "x", "price_CAD": 1.5, "quantity": 2 }))
                .unwrap();
        assert_eq!(draft.price, Some(1.5));
        assert_eq!(draft.quantity, Some(2));
    }

    #[test]
    fn to_draft_round_trips_user_fields() {
        let draft = ItemDraft::new("SKU_1", "n").with_price(2.0).with_quantity(7);
        let item = Item::create(ItemId::generate(), draft.clone(), t0());
        assert_eq!(item.to_draft(), draft);
    }
}
