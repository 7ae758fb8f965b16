use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::{InventoryResult, ItemId};
use stockroom_inventory::{Item, ItemDraft};

/// Persistence boundary for inventory items.
///
/// Implementations own identifier assignment and timestamping and must keep
/// SKUs unique across all stored items. Drafts passed to `create` and
/// `update` are expected to have gone through
/// [`validate_item`](stockroom_inventory::validate_item) already; stores do
/// not re-validate field formats.
///
/// ## Semantics
///
/// - `create`: fails with `DuplicateSku` if any stored item holds the SKU.
///   Mints a fresh identifier and sets `date_added = last_updated = now`.
/// - `update`: full replace of the user-managed fields. Fails with `NotFound`
///   for unknown identifiers and with `DuplicateSku` when the new SKU belongs to
///   a *different* item; keeping the current SKU is always allowed. On success
///   `last_updated` is reset to now. A failed update leaves the item untouched.
/// - `delete`: hard delete, `NotFound` for unknown identifiers.
/// - `get` / `list`: reads; `list` order is backend-defined.
/// - `bulk_load`: fixture loading. Items are stored as given (identifier and
///   timestamps included) and are assumed to be valid. Loading a SKU held by
///   a different item fails with `DuplicateSku` and loads nothing.
///   Never expose this to request handlers.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn create(&self, draft: ItemDraft) -> InventoryResult<Item>;

    async fn update(&self, id: &ItemId, draft: ItemDraft) -> InventoryResult<()>;

    async fn delete(&self, id: &ItemId) -> InventoryResult<()>;

    async fn get(&self, id: &ItemId) -> InventoryResult<Item>;

    async fn list(&self) -> InventoryResult<Vec<Item>>;

    async fn bulk_load(&self, items: Vec<Item>) -> InventoryResult<()>;

    /// Release backend resources. No-op unless the store holds connections.
    async fn close(&self) {}
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn create(&self, draft: ItemDraft) -> InventoryResult<Item> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &ItemId, draft: ItemDraft) -> InventoryResult<()> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &ItemId) -> InventoryResult<()> {
        (**self).delete(id).await
    }

    async fn get(&self, id: &ItemId) -> InventoryResult<Item> {
        (**self).get(id).await
    }

    async fn list(&self) -> InventoryResult<Vec<Item>> {
        (**self).list().await
    }

    async fn bulk_load(&self, items: Vec<Item>) -> InventoryResult<()> {
        (**self).bulk_load(items).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
