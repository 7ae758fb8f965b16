use axum::{routing::get, Router};

pub mod items;
pub mod system;

/// Router for the inventory item endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/api/items", get(items::list_items).post(items::create_item))
        .route(
            "/api/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
}
