//! Key hierarchy unwrapping.
//!
//! The master password derives a top-level key pair, which opens the
//! profile's master and overview key envelopes. Both tiers are hashed with
//! SHA-512 before being split into key pairs.

use tracing::debug;

use keysafe_common::Result;
use keysafe_crypto::{derive_key_pair, envelope, EnvelopeFormat, KeyPair};
use keysafe_storage::ProfileRecord;

/// Master and overview key pairs of an unlocked profile.
#[derive(Debug, Clone)]
pub struct KeyHierarchy {
    master: KeyPair,
    overview: KeyPair,
}

impl KeyHierarchy {
    /// Unwrap the hierarchy of a profile.
    ///
    /// # Postconditions
    /// - Both key pairs are available, or none is
    ///
    /// # Errors
    /// - `KeyDerivation` if PBKDF2 fails
    /// - `Authentication` if the password is wrong; the overview key is
    ///   never attempted when the master key fails
    /// - Any other envelope error, unchanged
    pub fn unlock(password: &[u8], profile: &ProfileRecord) -> Result<Self> {
        let top = derive_key_pair(password, &profile.salt, profile.iterations)?;
        debug!(iterations = profile.iterations, "Derived top-level key pair");

        let master = unwrap_tier(&top, &profile.master_key_data)?;
        let overview = unwrap_tier(&top, &profile.overview_key_data)?;

        Ok(Self { master, overview })
    }

    /// Key pair protecting per-item keys.
    pub fn master(&self) -> &KeyPair {
        &self.master
    }

    /// Key pair protecting overviews, and items without their own key.
    pub fn overview(&self) -> &KeyPair {
        &self.overview
    }
}

fn unwrap_tier(top: &KeyPair, wrapped: &[u8]) -> Result<KeyPair> {
    let raw = envelope::open(top, wrapped, EnvelopeFormat::Opdata01)?;
    Ok(KeyPair::split_hashed(raw.as_bytes()))
}
