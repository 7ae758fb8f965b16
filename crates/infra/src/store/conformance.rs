//! Behavioural checks every `InventoryStore` must pass.
//!
//! Each check expects an empty store and cleans up after itself, so the whole
//! suite can run against one backend instance.

use stockroom_core::{validate_identifier, InventoryError, ItemId};
use stockroom_inventory::{validate_item, Item, ItemDraft};

use super::r#trait::InventoryStore;

fn valid(mut draft: ItemDraft) -> ItemDraft {
    validate_item(&mut draft).expect("fixture drafts are valid");
    draft
}

async fn clear<S: InventoryStore + ?Sized>(store: &S) {
    for item in store.list().await.unwrap() {
        store.delete(&item.id).await.unwrap();
    }
}

pub async fn run_all<S: InventoryStore + ?Sized>(store: &S) {
    create_then_get_returns_the_draft(store).await;
    clear(store).await;
    duplicate_sku_on_create_is_rejected(store).await;
    clear(store).await;
    update_replaces_fields_and_bumps_last_updated(store).await;
    clear(store).await;
    update_to_another_items_sku_is_rejected(store).await;
    clear(store).await;
    update_with_own_sku_is_allowed(store).await;
    clear(store).await;
    update_and_delete_unknown_ids_are_not_found(store).await;
    clear(store).await;
    delete_removes_from_get_and_list(store).await;
    clear(store).await;
    omitted_price_clears_stored_price(store).await;
    clear(store).await;
    bulk_load_of_a_taken_sku_is_rejected(store).await;
    clear(store).await;
}

pub async fn create_then_get_returns_the_draft<S: InventoryStore + ?Sized>(store: &S) {
    let draft = valid(ItemDraft::new("01234567", "Thing1"));
    let created = store.create(draft.clone()).await.unwrap();

    validate_identifier(created.id.as_str()).unwrap();
    assert_eq!(created.quantity, 0);
    assert_eq!(created.date_added, created.last_updated);

    let fetched = store.get(&created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.to_draft(), draft);
    assert_eq!(fetched.date_added, fetched.last_updated);
}

pub async fn duplicate_sku_on_create_is_rejected<S: InventoryStore + ?Sized>(store: &S) {
    store
        .create(valid(ItemDraft::new("01234567", "Thing1")))
        .await
        .unwrap();
    let err = store
        .create(valid(ItemDraft::new("01234567", "Thing1")))
        .await
        .unwrap_err();
    assert_eq!(err, InventoryError::duplicate_sku("01234567"));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

pub async fn update_replaces_fields_and_bumps_last_updated<S: InventoryStore + ?Sized>(store: &S) {
    let created = store
        .create(valid(ItemDraft::new("AAAAAAAA", "Thing1").with_quantity(3)))
        .await
        .unwrap();

    let replacement = valid(
        ItemDraft::new("AAAA-0001", "Thing1 v2")
            .with_description("now with a description")
            .with_price(12.5)
            .with_quantity(10),
    );
    store.update(&created.id, replacement.clone()).await.unwrap();

    let updated = store.get(&created.id).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.to_draft(), replacement);
    assert_eq!(updated.date_added, created.date_added);
    assert!(updated.last_updated > created.last_updated);
}

pub async fn update_to_another_items_sku_is_rejected<S: InventoryStore + ?Sized>(store: &S) {
    let a = store
        .create(valid(ItemDraft::new("AAAAAAAA", "A")))
        .await
        .unwrap();
    store
        .create(valid(ItemDraft::new("BBBBBBBB", "B")))
        .await
        .unwrap();

    let err = store
        .update(&a.id, valid(ItemDraft::new("BBBBBBBB", "A renamed")))
        .await
        .unwrap_err();
    assert_eq!(err, InventoryError::duplicate_sku("BBBBBBBB"));

    let unchanged = store.get(&a.id).await.unwrap();
    assert_eq!(unchanged.sku, "AAAAAAAA");
    assert_eq!(unchanged.name, "A");
    assert_eq!(unchanged.last_updated, a.last_updated);
}

pub async fn update_with_own_sku_is_allowed<S: InventoryStore + ?Sized>(store: &S) {
    let a = store
        .create(valid(ItemDraft::new("AAAAAAAA", "A")))
        .await
        .unwrap();
    for _ in 0..3 {
        store
            .update(&a.id, valid(ItemDraft::new("AAAAAAAA", "A")))
            .await
            .unwrap();
    }
    assert_eq!(store.get(&a.id).await.unwrap().sku, "AAAAAAAA");
}

pub async fn update_and_delete_unknown_ids_are_not_found<S: InventoryStore + ?Sized>(store: &S) {
    let missing = ItemId::generate();

    let err = store
        .update(&missing, valid(ItemDraft::new("AAAAAAAA", "A")))
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));

    let err = store.delete(&missing).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));

    let err = store.get(&missing).await.unwrap_err();
    assert_eq!(err, InventoryError::not_found(&missing));
}

pub async fn delete_removes_from_get_and_list<S: InventoryStore + ?Sized>(store: &S) {
    let a = store
        .create(valid(ItemDraft::new("AAAAAAAA", "A")))
        .await
        .unwrap();
    let b = store
        .create(valid(ItemDraft::new("BBBBBBBB", "B")))
        .await
        .unwrap();

    store.delete(&a.id).await.unwrap();

    assert!(matches!(
        store.get(&a.id).await.unwrap_err(),
        InventoryError::NotFound(_)
    ));
    let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![b.id]);

    // The SKU is free again.
    store
        .create(valid(ItemDraft::new("AAAAAAAA", "A again")))
        .await
        .unwrap();
}

pub async fn omitted_price_clears_stored_price<S: InventoryStore + ?Sized>(store: &S) {
    let a = store
        .create(valid(ItemDraft::new("AAAAAAAA", "A").with_price(3.25)))
        .await
        .unwrap();
    assert_eq!(store.get(&a.id).await.unwrap().price, Some(3.25));

    store
        .update(&a.id, valid(ItemDraft::new("AAAAAAAA", "A")))
        .await
        .unwrap();
    let updated = store.get(&a.id).await.unwrap();
    assert_eq!(updated.price, None);
    assert_eq!(updated.quantity, 0);
}

pub async fn bulk_load_of_a_taken_sku_is_rejected<S: InventoryStore + ?Sized>(store: &S) {
    let a = store
        .create(valid(ItemDraft::new("AAAAAAAA", "A")))
        .await
        .unwrap();

    let fixture = Item::create(ItemId::generate(), valid(ItemDraft::new("AAAAAAAA", "dup")), a.date_added);
    let err = store.bulk_load(vec![fixture.clone()]).await.unwrap_err();
    assert_eq!(err, InventoryError::duplicate_sku("AAAAAAAA"));
    assert!(matches!(
        store.get(&fixture.id).await.unwrap_err(),
        InventoryError::NotFound(_)
    ));

    // The original holder keeps the SKU through a delete/create cycle.
    store.delete(&a.id).await.unwrap();
    store
        .create(valid(ItemDraft::new("AAAAAAAA", "A again")))
        .await
        .unwrap();
    assert_eq!(store.list().await.unwrap().len(), 1);
}
