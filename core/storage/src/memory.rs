//! In-memory profile store for testing.

use async_trait::async_trait;

use crate::provider::{DetailRecord, ItemRecord, ProfileRecord, ProfileStore};
use keysafe_common::{Error, ProfileName, Result};

#[derive(Debug, Clone)]
struct StoredItem {
    profile_id: i64,
    trashed: bool,
    record: ItemRecord,
}

/// In-memory profile store.
///
/// Useful for testing and for embedding rows obtained elsewhere. Records
/// are supplied up front through the builder methods and are read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Vec<(String, ProfileRecord)>,
    items: Vec<StoredItem>,
    details: Vec<DetailRecord>,
}

impl MemoryProfileStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named profile.
    pub fn with_profile(mut self, name: impl Into<String>, profile: ProfileRecord) -> Self {
        self.profiles.push((name.into(), profile));
        self
    }

    /// Add an item to a profile.
    pub fn with_item(mut self, profile_id: i64, item: ItemRecord) -> Self {
        self.items.push(StoredItem {
            profile_id,
            trashed: false,
            record: item,
        });
        self
    }

    /// Add a trashed item. Trashed items are never listed.
    pub fn with_trashed_item(mut self, profile_id: i64, item: ItemRecord) -> Self {
        self.items.push(StoredItem {
            profile_id,
            trashed: true,
            record: item,
        });
        self
    }

    /// Add a detail row.
    pub fn with_detail(mut self, detail: DetailRecord) -> Self {
        self.details.push(detail);
        self
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_profile(&self, name: &ProfileName) -> Result<ProfileRecord> {
        self.profiles
            .iter()
            .find(|(n, _)| n == name.as_str())
            .map(|(_, profile)| profile.clone())
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    async fn list_items(&self, profile_id: i64) -> Result<Vec<ItemRecord>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.profile_id == profile_id && !item.trashed)
            .map(|item| item.record.clone())
            .collect())
    }

    async fn list_item_details(&self) -> Result<Vec<DetailRecord>> {
        Ok(self.details.clone())
    }
}
