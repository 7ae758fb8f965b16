//! Inventory domain module.
//!
//! The item model and the rules that decide whether a candidate item is
//! well-formed, implemented as pure logic (no IO, no HTTP, no storage).

pub mod item;
pub mod validation;

pub use item::{Item, ItemDraft};
pub use validation::validate_item;
