//! Common error types for Keysafe.

use thiserror::Error;

/// Top-level error type for Keysafe operations.
///
/// Cloneable so that a failed unlock can be reported to every caller
/// waiting on the same vault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No profile with the requested name exists in the vault.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Password-based key derivation failed at the platform level.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A header-bearing envelope did not start with the expected magic.
    #[error("Envelope checksum mismatch")]
    ChecksumMismatch,

    /// The envelope MAC did not verify. This is how a wrong master
    /// password surfaces.
    #[error("Authentication failed")]
    Authentication,

    /// The cipher rejected the ciphertext.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The vault was queried before unlock completed.
    #[error("Vault is not ready")]
    NotReady,

    /// A search found no entry with the requested title.
    #[error("No entry titled {0:?}")]
    NoMatch(String),

    /// Reading rows from the profile store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Decrypted payload was not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Vault lifecycle failure outside the crypto stages.
    #[error("Vault error: {0}")]
    Vault(String),
}

impl Error {
    /// Whether this error means the master password was rejected.
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, Error::Authentication)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
