//! Vault configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use keysafe_common::{Error, ProfileName, Result};

/// Directory under the user data dir holding the default vault.
pub const DATA_DIRNAME: &str = "keysafe";

/// File name of the default vault database.
pub const DATABASE_FILENAME: &str = "vault.sqlite";

/// Where to find a vault and which profile to open.
///
/// The database location is always explicit; the core never resolves it
/// from the environment on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Path of the vault's SQLite database.
    pub database: PathBuf,
    /// Profile to unlock.
    #[serde(default)]
    pub profile: ProfileName,
}

impl VaultConfig {
    /// Create a configuration for the default profile of a database.
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            profile: ProfileName::default(),
        }
    }

    /// Select a profile other than `"default"`.
    ///
    /// # Errors
    /// - Returns error if `profile` is empty
    pub fn with_profile(mut self, profile: impl Into<String>) -> Result<Self> {
        self.profile = ProfileName::new(profile)?;
        Ok(self)
    }

    /// Conventional per-user location of the vault database, if the
    /// platform has a data directory.
    pub fn default_database_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(DATA_DIRNAME).join(DATABASE_FILENAME))
    }

    /// Path of the vault's database.
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}
