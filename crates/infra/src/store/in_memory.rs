use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use stockroom_core::{Clock, InventoryError, InventoryResult, ItemId, SystemClock};
use stockroom_inventory::{Item, ItemDraft};

use super::r#trait::InventoryStore;

/// Both lookup structures, always mutated together under one lock.
#[derive(Debug, Default)]
struct Indexes {
    by_id: BTreeMap<ItemId, Item>,
    by_sku: HashMap<String, ItemId>,
}

/// In-memory inventory store.
///
/// Items are keyed by identifier, with a SKU → identifier index kept in
/// lockstep. Since identifiers sort by creation time, `list` returns items
/// roughly in the order they were created.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryInventoryStore<C = SystemClock> {
    indexes: RwLock<Indexes>,
    clock: C,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryInventoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            indexes: RwLock::new(Indexes::default()),
            clock,
        }
    }

    fn read(&self) -> InventoryResult<RwLockReadGuard<'_, Indexes>> {
        self.indexes
            .read()
            .map_err(|_| InventoryError::storage("lock poisoned"))
    }

    fn write(&self) -> InventoryResult<RwLockWriteGuard<'_, Indexes>> {
        self.indexes
            .write()
            .map_err(|_| InventoryError::storage("lock poisoned"))
    }
}

#[async_trait]
impl<C: Clock> InventoryStore for InMemoryInventoryStore<C> {
    async fn create(&self, draft: ItemDraft) -> InventoryResult<Item> {
        let mut guard = self.write()?;
        let Indexes { by_id, by_sku } = &mut *guard;

        if by_sku.contains_key(&draft.sku) {
            debug!(sku = %draft.sku, "create rejected: duplicate sku");
            return Err(InventoryError::duplicate_sku(draft.sku));
        }

        let item = Item::create(ItemId::generate(), draft, self.clock.now());
        by_sku.insert(item.sku.clone(), item.id.clone());
        by_id.insert(item.id.clone(), item.clone());

        debug!(id = %item.id, sku = %item.sku, "item created");
        Ok(item)
    }

    async fn update(&self, id: &ItemId, draft: ItemDraft) -> InventoryResult<()> {
        let mut guard = self.write()?;
        let Indexes { by_id, by_sku } = &mut *guard;

        let item = by_id.get_mut(id).ok_or_else(|| InventoryError::not_found(id))?;

        if item.sku != draft.sku {
            // The current SKU maps to this item, so any hit here is another item.
            if by_sku.contains_key(&draft.sku) {
                debug!(%id, sku = %draft.sku, "update rejected: duplicate sku");
                return Err(InventoryError::duplicate_sku(draft.sku));
            }
            by_sku.remove(&item.sku);
            by_sku.insert(draft.sku.clone(), id.clone());
        }

        item.replace(draft, self.clock.now());
        debug!(%id, sku = %item.sku, "item updated");
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> InventoryResult<()> {
        let mut guard = self.write()?;
        let Indexes { by_id, by_sku } = &mut *guard;

        let item = by_id.remove(id).ok_or_else(|| InventoryError::not_found(id))?;
        by_sku.remove(&item.sku);

        debug!(%id, sku = %item.sku, "item deleted");
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> InventoryResult<Item> {
        self.read()?
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| InventoryError::not_found(id))
    }

    async fn list(&self) -> InventoryResult<Vec<Item>> {
        Ok(self.read()?.by_id.values().cloned().collect())
    }

    async fn bulk_load(&self, items: Vec<Item>) -> InventoryResult<()> {
        let mut guard = self.write()?;
        let Indexes { by_id, by_sku } = &mut *guard;

        // Replay the batch against a copy of the SKU index first, so a
        // collision leaves the store exactly as it was.
        let mut staged = by_sku.clone();
        let mut reloaded: HashMap<&ItemId, &str> = HashMap::new();
        for item in &items {
            if let Some(owner) = staged.get(&item.sku) {
                if *owner != item.id {
                    debug!(id = %item.id, sku = %item.sku, "bulk load rejected: duplicate sku");
                    return Err(InventoryError::duplicate_sku(item.sku.clone()));
                }
            }
            // Reloading an identifier must not leave its old SKU behind.
            let previous = reloaded
                .get(&item.id)
                .copied()
                .or_else(|| by_id.get(&item.id).map(|i| i.sku.as_str()));
            if let Some(previous) = previous {
                if previous != item.sku {
                    staged.remove(previous);
                }
            }
            staged.insert(item.sku.clone(), item.id.clone());
            reloaded.insert(&item.id, &item.sku);
        }

        let count = items.len();
        *by_sku = staged;
        for item in items {
            by_id.insert(item.id.clone(), item);
        }

        debug!(count, "items bulk loaded");
        Ok(())
    }
}
