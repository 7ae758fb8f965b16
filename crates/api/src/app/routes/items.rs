use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use stockroom_core::{InventoryError, ItemId};
use stockroom_infra::InventoryStore;
use stockroom_inventory::{validate_item, ItemDraft};

use crate::app::{dto, errors};

type Store = Arc<dyn InventoryStore>;

pub async fn create_item(
    Extension(store): Extension<Store>,
    body: Result<Json<dto::ItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let draft = match decode_draft(body) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    match store.create(draft).await {
        Ok(item) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/{}", item.id))],
            Json(serde_json::json!({ "id": item.id })),
        )
            .into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(store): Extension<Store>,
    Path(id): Path<String>,
    body: Result<Json<dto::ItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let draft = match decode_draft(body) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let id = match parse_path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.update(&id, draft).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(store): Extension<Store>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn list_items(Extension(store): Extension<Store>) -> axum::response::Response {
    match store.list().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(store): Extension<Store>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.get(&id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// Decode, normalize and validate a request body. Runs before any store call.
fn decode_draft(
    body: Result<Json<dto::ItemRequest>, JsonRejection>,
) -> Result<ItemDraft, axum::response::Response> {
    let Json(request) = body.map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "malformed_body", rejection.body_text())
    })?;
    let mut draft = request
        .into_draft()
        .map_err(errors::inventory_error_to_response)?;
    validate_item(&mut draft).map_err(errors::inventory_error_to_response)?;
    Ok(draft)
}

/// A path segment that is not a well-formed identifier cannot name a stored item.
fn parse_path_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    ItemId::parse(raw).map_err(|_| errors::inventory_error_to_response(InventoryError::not_found(raw)))
}
