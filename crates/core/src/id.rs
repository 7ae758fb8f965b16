//! Item identifiers.
//!
//! An `ItemId` is 20 characters of base32hex (`[0-9a-v]`). Fresh identifiers
//! are derived from a UUIDv7, so they sort by creation time: the 48-bit
//! millisecond timestamp leads, followed by 52 bits of the UUID's random tail.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};

/// Length of every item identifier.
pub const ID_LEN: usize = 20;

const BASE32HEX: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Globally-unique, immutable identifier of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Mint a new identifier.
    pub fn generate() -> Self {
        Self::from_uuid_v7(Uuid::now_v7())
    }

    /// Parse and validate an identifier.
    pub fn parse(s: &str) -> InventoryResult<Self> {
        validate_identifier(s)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_uuid_v7(uuid: Uuid) -> Self {
        let raw = uuid.as_u128();
        let millis = raw >> 80;
        let rand_a = (raw >> 64) & 0xfff;
        let rand_b = raw & ((1u128 << 62) - 1);

        // 48 + 12 + 40 = 100 bits = 20 base32 digits.
        let packed = (millis << 52) | (rand_a << 40) | (rand_b >> 22);

        let encoded = (0..ID_LEN)
            .map(|i| {
                let shift = 5 * (ID_LEN - 1 - i);
                BASE32HEX[((packed >> shift) & 0x1f) as usize] as char
            })
            .collect();
        Self(encoded)
    }
}

/// Check that `id` is exactly [`ID_LEN`] characters drawn from `[a-v0-9]`.
pub fn validate_identifier(id: &str) -> InventoryResult<()> {
    if id.chars().count() != ID_LEN {
        return Err(InventoryError::malformed_identifier(format!(
            "id must be {ID_LEN} characters in length"
        )));
    }
    if !id.chars().all(|c| matches!(c, 'a'..='v' | '0'..='9')) {
        return Err(InventoryError::malformed_identifier(
            "id may only contain [a-v 0-9]",
        ));
    }
    Ok(())
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_identifier(&value)?;
        Ok(Self(value))
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
