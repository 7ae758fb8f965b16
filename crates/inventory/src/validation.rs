//! Item validation and normalization.
//!
//! Validation and normalization are one pass: the validators trim text fields
//! and fill the default quantity on the candidate they check. Nothing here
//! looks at storage.

use stockroom_core::{InventoryError, InventoryResult};

use crate::item::ItemDraft;

pub use stockroom_core::validate_identifier;

pub const SKU_MIN_LEN: usize = 4;
pub const SKU_MAX_LEN: usize = 12;

/// SKUs are 4 to 12 characters of letters, digits, `-` or `_`.
pub fn validate_sku(sku: &str) -> InventoryResult<()> {
    let len = sku.chars().count();
    if !(SKU_MIN_LEN..=SKU_MAX_LEN).contains(&len) {
        return Err(InventoryError::malformed_sku(format!(
            "sku must be between {SKU_MIN_LEN} and {SKU_MAX_LEN} characters in length"
        )));
    }
    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(InventoryError::malformed_sku(
            "sku may only contain [a-z A-Z 0-9 _ -]",
        ));
    }
    Ok(())
}

/// Trims `name`; it must keep at least one character.
pub fn validate_name(name: &mut String) -> InventoryResult<()> {
    trim_in_place(name);
    if name.is_empty() {
        return Err(InventoryError::MissingName);
    }
    Ok(())
}

/// Trims `description`. Descriptions have no format rule.
pub fn validate_description(description: &mut String) {
    trim_in_place(description);
}

pub fn validate_price(price: Option<f64>) -> InventoryResult<()> {
    match price {
        // Written so that NaN is rejected too.
        Some(p) if !(p >= 0.0) => Err(InventoryError::NegativePrice),
        _ => Ok(()),
    }
}

/// Absent quantities become 0.
pub fn validate_quantity(quantity: &mut Option<i64>) -> InventoryResult<()> {
    match quantity {
        Some(q) if *q < 0 => Err(InventoryError::NegativeQuantity),
        Some(_) => Ok(()),
        None => {
            *quantity = Some(0);
            Ok(())
        }
    }
}

/// Normalize `draft` in place and check every field.
///
/// Runs sku, name, description, price, quantity in that order and stops at
/// the first failure. Must be called before handing a draft to a store.
pub fn validate_item(draft: &mut ItemDraft) -> InventoryResult<()> {
    validate_sku(&draft.sku)?;
    validate_name(&mut draft.name)?;
    validate_description(&mut draft.description);
    validate_price(draft.price)?;
    validate_quantity(&mut draft.quantity)?;
    Ok(())
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}
