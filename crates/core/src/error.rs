//! Inventory error model.

use thiserror::Error;

/// Result type used across the inventory layers.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Coarse classification of a failure, independent of any transport.
///
/// The HTTP layer maps these one-to-one onto status codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent a malformed item or identifier.
    BadRequest,
    /// The request collides with stored state (duplicate SKU).
    Conflict,
    /// The addressed item does not exist.
    NotFound,
    /// The storage backend failed unexpectedly.
    Internal,
}

/// Inventory failure.
///
/// Validation variants are raised before any storage mutation; `DuplicateSku`
/// and `NotFound` come from the store; `Storage` covers backend I/O failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("malformed id: {0}")]
    MalformedIdentifier(String),

    #[error("malformed sku: {0}")]
    MalformedSku(String),

    #[error("name cannot be whitespace or empty")]
    MissingName,

    #[error("price_CAD cannot be negative")]
    NegativePrice,

    #[error("quantity cannot be negative")]
    NegativeQuantity,

    #[error("there is already an item with sku {0}")]
    DuplicateSku(String),

    #[error("there is no item with id {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl InventoryError {
    pub fn malformed_identifier(msg: impl Into<String>) -> Self {
        Self::MalformedIdentifier(msg.into())
    }

    pub fn malformed_sku(msg: impl Into<String>) -> Self {
        Self::MalformedSku(msg.into())
    }

    pub fn duplicate_sku(sku: impl Into<String>) -> Self {
        Self::DuplicateSku(sku.into())
    }

    pub fn not_found(id: impl core::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedIdentifier(_)
            | Self::MalformedSku(_)
            | Self::MissingName
            | Self::NegativePrice
            | Self::NegativeQuantity => ErrorClass::BadRequest,
            Self::DuplicateSku(_) => ErrorClass::Conflict,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Storage(_) => ErrorClass::Internal,
        }
    }

    /// Stable machine-readable code, used as the `error` field of API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedIdentifier(_) => "malformed_identifier",
            Self::MalformedSku(_) => "malformed_sku",
            Self::MissingName => "missing_name",
            Self::NegativePrice => "negative_price",
            Self::NegativeQuantity => "negative_quantity",
            Self::DuplicateSku(_) => "duplicate_sku",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage_error",
        }
    }
}
