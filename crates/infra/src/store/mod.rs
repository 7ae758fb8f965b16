//! Inventory persistence boundary.
//!
//! One trait, two backends: an in-memory store for tests and local runs, and
//! a Postgres store for everything else.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

#[cfg(test)]
pub(crate) mod conformance;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::InventoryStore;
