use serde::Deserialize;

use stockroom_core::{validate_identifier, InventoryResult};
use stockroom_inventory::ItemDraft;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/items` and `PUT /api/items/{id}`.
///
/// Identifiers are always assigned by the store. A client may echo one back
/// (e.g. after a GET), so `id` is accepted, checked for shape, and dropped.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub item: ItemDraft,
}

impl ItemRequest {
    pub fn into_draft(self) -> InventoryResult<ItemDraft> {
        if let Some(id) = &self.id {
            validate_identifier(id)?;
        }
        Ok(self.item)
    }
}
