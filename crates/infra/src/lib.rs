//! Infrastructure layer: item storage backends.

pub mod store;

pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore};
