//! Synthetic vaults for unit tests.

use serde_json::{json, Value};

use keysafe_crypto::{derive_key_pair, seal, EnvelopeFormat, KeyPair};
use keysafe_storage::{DetailRecord, ItemRecord, MemoryProfileStore, ProfileRecord};

pub(crate) const PROFILE_ID: i64 = 1;

/// A profile sealed under a known password, plus items and details.
pub(crate) struct VaultFixture {
    pub profile: ProfileRecord,
    pub master_raw: Vec<u8>,
    pub master: KeyPair,
    pub overview: KeyPair,
    pub items: Vec<ItemRecord>,
    pub details: Vec<DetailRecord>,
}

impl VaultFixture {
    pub fn new(password: &[u8]) -> Self {
        let salt = vec![0u8; 16];
        let top = derive_key_pair(password, &salt, 2).unwrap();

        let master_raw: Vec<u8> = (0..=255u8).collect();
        let overview_raw = vec![0x0Fu8; 64];

        let profile = ProfileRecord {
            id: PROFILE_ID,
            iterations: 2,
            salt,
            master_key_data: seal(&top, &master_raw, EnvelopeFormat::Opdata01).unwrap(),
            overview_key_data: seal(&top, &overview_raw, EnvelopeFormat::Opdata01).unwrap(),
        };

        Self {
            profile,
            master: KeyPair::split_hashed(&master_raw),
            overview: KeyPair::split_hashed(&overview_raw),
            master_raw,
            items: Vec::new(),
            details: Vec::new(),
        }
    }

    /// Add an item protected by the overview key pair.
    pub fn add_shared_item(&mut self, id: i64, title: &str) -> KeyPair {
        self.push_item(id, json!({ "title": title }), Vec::new());
        self.overview.clone()
    }

    /// Add an item with its own key pair.
    pub fn add_keyed_item(&mut self, id: i64, title: &str) -> KeyPair {
        let material: Vec<u8> = (0..64u8).map(|b| b.wrapping_mul(id as u8).wrapping_add(3)).collect();
        let key_data = seal(&self.master, &material, EnvelopeFormat::Bare).unwrap();
        self.push_item(id, json!({ "title": title }), key_data);
        KeyPair::split(&material).unwrap()
    }

    pub fn push_item(&mut self, id: i64, overview: Value, key_data: Vec<u8>) {
        let overview_data = seal(
            &self.overview,
            overview.to_string().as_bytes(),
            EnvelopeFormat::Bare,
        )
        .unwrap();
        self.items.push(ItemRecord {
            id,
            key_data,
            overview_data,
        });
    }

    /// Add a detail with a password field, sealed under `key_pair`.
    pub fn add_detail(&mut self, item_id: i64, key_pair: &KeyPair, password: &str) {
        let detail = json!({
            "fields": [{ "designation": "password", "value": password }]
        });
        self.details.push(DetailRecord {
            item_id,
            data: seal(key_pair, detail.to_string().as_bytes(), EnvelopeFormat::Opdata01)
                .unwrap(),
        });
    }

    pub fn store(&self) -> MemoryProfileStore {
        let store = MemoryProfileStore::new().with_profile("default", self.profile.clone());
        let store = self
            .items
            .iter()
            .cloned()
            .fold(store, |store, item| store.with_item(PROFILE_ID, item));
        self.details
            .iter()
            .cloned()
            .fold(store, |store, detail| store.with_detail(detail))
    }
}
