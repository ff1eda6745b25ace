//! Profile store trait and the row types it returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use keysafe_common::{ProfileName, Result};

/// Identifier of a vault item.
pub type ItemId = i64;

/// Key-derivation parameters and wrapped keys for one profile.
///
/// Fetched once per unlock and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Row identifier, used to select the profile's items.
    pub id: i64,
    /// PBKDF2 iteration count.
    pub iterations: u64,
    /// PBKDF2 salt.
    pub salt: Vec<u8>,
    /// `opdata01` envelope holding the master key material.
    pub master_key_data: Vec<u8>,
    /// `opdata01` envelope holding the overview key material.
    pub overview_key_data: Vec<u8>,
}

/// One non-trashed vault item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    /// Bare envelope with the item's own key pair, or empty when the item
    /// is protected by the overview key pair.
    pub key_data: Vec<u8>,
    /// Bare envelope with the overview JSON.
    pub overview_data: Vec<u8>,
}

/// Detail payload for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub item_id: ItemId,
    /// `opdata01` envelope with the detail JSON.
    pub data: Vec<u8>,
}

/// Read-only access to the rows of a vault.
///
/// Implementations must handle their own connection management. The unlock
/// pipeline takes a store by value and drops it as soon as the rows are
/// fetched, so no handle is held once a vault is open.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get the backend name (e.g., "sqlite", "memory").
    fn name(&self) -> &str;

    /// Fetch the profile with the given name.
    ///
    /// # Errors
    /// - `ProfileNotFound` if no profile has that name
    /// - `Storage` on backend failure
    async fn get_profile(&self, name: &ProfileName) -> Result<ProfileRecord>;

    /// List the non-trashed items of a profile.
    async fn list_items(&self, profile_id: i64) -> Result<Vec<ItemRecord>>;

    /// List every item detail row.
    ///
    /// Rows may reference items that are trashed or belong to another
    /// profile; consumers skip those.
    async fn list_item_details(&self) -> Result<Vec<DetailRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let item = ItemRecord {
            id: 7,
            key_data: vec![],
            overview_data: vec![1, 2, 3],
        };

        let json = serde_json::to_string(&item).unwrap();
        let deserialized: ItemRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, item);
    }
}
