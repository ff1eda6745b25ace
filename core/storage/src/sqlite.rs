//! SQLite profile store.
//!
//! Reads the `profiles`, `items` and `item_details` tables of a vault
//! database. The connection is opened read-only and queries run on the
//! blocking thread pool.

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::provider::{DetailRecord, ItemRecord, ProfileRecord, ProfileStore};
use keysafe_common::{Error, ProfileName, Result};

/// Tables read by [`SqliteProfileStore`].
///
/// No foreign keys: detail rows may outlive their items, and the store
/// only ever reads.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id INTEGER PRIMARY KEY,
    profile_name TEXT NOT NULL UNIQUE,
    iterations INTEGER NOT NULL,
    salt BLOB NOT NULL,
    master_key_data BLOB NOT NULL,
    overview_key_data BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    profile_id INTEGER NOT NULL,
    key_data BLOB,
    overview_data BLOB NOT NULL,
    trashed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS item_details (
    item_id INTEGER PRIMARY KEY,
    data BLOB NOT NULL
);
"#;

/// Profile store backed by a vault's SQLite database.
pub struct SqliteProfileStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProfileStore {
    /// Open the database at `path` read-only.
    ///
    /// # Errors
    /// - Database file does not exist
    /// - SQLite cannot open the file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::Storage(format!(
                "Vault database not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(storage_error)?;

        debug!(path = %path.display(), "Opened profile store");
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a query on the blocking pool.
    async fn query<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::Storage("Connection lock poisoned".to_string()))?;
            f(&*conn).map_err(storage_error)
        })
        .await
        .map_err(|e| Error::Storage(format!("Query task failed: {}", e)))?
    }
}

fn storage_error(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get_profile(&self, name: &ProfileName) -> Result<ProfileRecord> {
        let profile_name = name.as_str().to_string();
        let row = self
            .query(move |conn| {
                conn.query_row(
                    "SELECT id, iterations, salt, master_key_data, overview_key_data
                     FROM profiles WHERE profile_name = ?1",
                    params![profile_name],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                            row.get::<_, Vec<u8>>(4)?,
                        ))
                    },
                )
                .optional()
            })
            .await?;

        let (id, iterations, salt, master_key_data, overview_key_data) =
            row.ok_or_else(|| Error::ProfileNotFound(name.to_string()))?;

        let iterations = u64::try_from(iterations).map_err(|_| {
            Error::InvalidInput(format!("Negative iteration count: {}", iterations))
        })?;

        Ok(ProfileRecord {
            id,
            iterations,
            salt,
            master_key_data,
            overview_key_data,
        })
    }

    async fn list_items(&self, profile_id: i64) -> Result<Vec<ItemRecord>> {
        let items = self
            .query(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, key_data, overview_data FROM items
                     WHERE profile_id = ?1 AND trashed = 0
                     ORDER BY id",
                )?;
                let rows = stmt.query_map(params![profile_id], |row| {
                    Ok(ItemRecord {
                        id: row.get(0)?,
                        key_data: row.get::<_, Option<Vec<u8>>>(1)?.unwrap_or_default(),
                        overview_data: row.get(2)?,
                    })
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;

        debug!(profile_id, count = items.len(), "Listed items");
        Ok(items)
    }

    async fn list_item_details(&self) -> Result<Vec<DetailRecord>> {
        let details = self
            .query(|conn| {
                let mut stmt = conn.prepare("SELECT item_id, data FROM item_details")?;
                let rows = stmt.query_map([], |row| {
                    Ok(DetailRecord {
                        item_id: row.get(0)?,
                        data: row.get(1)?,
                    })
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;

        debug!(count = details.len(), "Listed item details");
        Ok(details)
    }
}
