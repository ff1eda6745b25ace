//! Builders for sealed vault databases.

use rusqlite::{params, Connection};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use keysafe_crypto::{derive_key_pair, seal, EnvelopeFormat, KeyPair};
use keysafe_storage::SCHEMA;

pub const PASSWORD: &[u8] = b"hunter2";
pub const ITERATIONS: u32 = 2;

/// Writes a profile and its items into a fresh SQLite database.
pub struct VaultBuilder {
    conn: Connection,
    path: PathBuf,
    profile_id: i64,
    pub top: KeyPair,
    pub master: KeyPair,
    pub overview: KeyPair,
}

impl VaultBuilder {
    pub fn create(dir: &Path, profile: &str, password: &[u8]) -> Self {
        let path = dir.join("vault.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let mut builder = Self {
            conn,
            path,
            profile_id: 0,
            top: KeyPair::new([0u8; 32], [0u8; 32]),
            master: KeyPair::new([0u8; 32], [0u8; 32]),
            overview: KeyPair::new([0u8; 32], [0u8; 32]),
        };
        builder.add_profile(1, profile, password);
        builder
    }

    /// Add a profile and make it the target of later items.
    pub fn add_profile(&mut self, id: i64, name: &str, password: &[u8]) {
        let salt = [0u8; 16];
        self.top = derive_key_pair(password, &salt, u64::from(ITERATIONS)).unwrap();

        let master_raw = vec![id as u8; 256];
        let overview_raw = vec![id as u8 ^ 0xFF; 64];
        self.master = KeyPair::split_hashed(&master_raw);
        self.overview = KeyPair::split_hashed(&overview_raw);

        self.conn
            .execute(
                "INSERT INTO profiles VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    name,
                    ITERATIONS,
                    salt.to_vec(),
                    seal(&self.top, &master_raw, EnvelopeFormat::Opdata01).unwrap(),
                    seal(&self.top, &overview_raw, EnvelopeFormat::Opdata01).unwrap(),
                ],
            )
            .unwrap();
        self.profile_id = id;
    }

    /// Add an item with its own key pair; returns that key pair.
    pub fn add_item(&mut self, id: i64, overview: Value) -> KeyPair {
        let material: Vec<u8> = (0..64).map(|i| (i as u8).wrapping_add(id as u8)).collect();
        let key_data = seal(&self.master, &material, EnvelopeFormat::Bare).unwrap();
        self.insert_item(id, Some(key_data), &overview, false);
        KeyPair::split(&material).unwrap()
    }

    /// Add an item protected by the overview key pair.
    pub fn add_shared_item(&mut self, id: i64, overview: Value) -> KeyPair {
        self.insert_item(id, None, &overview, false);
        self.overview.clone()
    }

    pub fn add_trashed_item(&mut self, id: i64, overview: Value) {
        self.insert_item(id, None, &overview, true);
    }

    pub fn add_detail(&mut self, item_id: i64, key_pair: &KeyPair, detail: Value) {
        let data = seal(key_pair, detail.to_string().as_bytes(), EnvelopeFormat::Opdata01).unwrap();
        self.add_raw_detail(item_id, data);
    }

    pub fn add_raw_detail(&mut self, item_id: i64, data: Vec<u8>) {
        self.conn
            .execute("INSERT INTO item_details VALUES (?1, ?2)", params![item_id, data])
            .unwrap();
    }

    fn insert_item(&mut self, id: i64, key_data: Option<Vec<u8>>, overview: &Value, trashed: bool) {
        let overview_data =
            seal(&self.overview, overview.to_string().as_bytes(), EnvelopeFormat::Bare).unwrap();
        self.conn
            .execute(
                "INSERT INTO items VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, self.profile_id, key_data, overview_data, trashed],
            )
            .unwrap();
    }

    /// Close the database and return its path.
    pub fn finish(self) -> PathBuf {
        self.path
    }
}

pub fn login(password: &str) -> Value {
    json!({
        "fields": [
            { "designation": "username", "value": "alice" },
            { "designation": "password", "value": password }
        ]
    })
}
