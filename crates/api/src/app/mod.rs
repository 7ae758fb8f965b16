//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use stockroom_infra::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore};

use crate::config::{ApiConfig, StoreBackend};

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router around an already-constructed store.
pub fn build_app(store: Arc<dyn InventoryStore>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(store)))
}

/// Construct the store selected by `config`.
pub async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn InventoryStore>> {
    let store: Arc<dyn InventoryStore> = match &config.backend {
        StoreBackend::Memory => Arc::new(InMemoryInventoryStore::new()),
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => Arc::new(
            PostgresInventoryStore::connect(database_url, *max_connections)
                .await
                .context("failed to connect to postgres")?,
        ),
    };
    tracing::info!(backend = config.backend.name(), "inventory store ready");
    Ok(store)
}
