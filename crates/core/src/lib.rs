//! `stockroom-core` — shared building blocks for the inventory layers.
//!
//! This crate contains **pure** primitives (no storage, no HTTP).

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use error::{ErrorClass, InventoryError, InventoryResult};
pub use id::{validate_identifier, ItemId, ID_LEN};
