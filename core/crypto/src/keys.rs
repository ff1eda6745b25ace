//! Key types with secure memory handling.
//!
//! Every decryption capability in a vault is a [`KeyPair`]: one key for
//! AES-256-CBC and one for HMAC-SHA256. Key pairs zeroize their memory on
//! drop so unwrapped keys do not outlive the vault that holds them.

use sha2::{Digest, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use keysafe_common::{Error, Result};

/// Length of each half of a key pair in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of the raw material a key pair is split from.
pub const KEY_PAIR_LENGTH: usize = 2 * KEY_LENGTH;

/// Encryption key plus MAC key.
///
/// Produced either by password derivation or by splitting 64 bytes of
/// unwrapped key material. Never mutated after creation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    encryption_key: [u8; KEY_LENGTH],
    mac_key: [u8; KEY_LENGTH],
}

impl KeyPair {
    /// Create a key pair from its two halves.
    pub fn new(encryption_key: [u8; KEY_LENGTH], mac_key: [u8; KEY_LENGTH]) -> Self {
        Self {
            encryption_key,
            mac_key,
        }
    }

    /// Split 64 bytes into an encryption key (first half) and a MAC key
    /// (second half).
    pub fn from_bytes(material: &[u8; KEY_PAIR_LENGTH]) -> Self {
        let mut encryption_key = [0u8; KEY_LENGTH];
        let mut mac_key = [0u8; KEY_LENGTH];
        encryption_key.copy_from_slice(&material[..KEY_LENGTH]);
        mac_key.copy_from_slice(&material[KEY_LENGTH..]);
        Self::new(encryption_key, mac_key)
    }

    /// Split raw key material as-is.
    ///
    /// # Errors
    /// - Returns error if `material` is not exactly KEY_PAIR_LENGTH bytes
    pub fn split(material: &[u8]) -> Result<Self> {
        let material: &[u8; KEY_PAIR_LENGTH] = material.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "Invalid key material length: expected {}, got {}",
                KEY_PAIR_LENGTH,
                material.len()
            ))
        })?;
        Ok(Self::from_bytes(material))
    }

    /// Hash raw key material with SHA-512, then split the digest.
    ///
    /// Used for the master and overview tiers, whose stored key material
    /// is not itself a key pair.
    pub fn split_hashed(material: &[u8]) -> Self {
        let mut digest = [0u8; KEY_PAIR_LENGTH];
        digest.copy_from_slice(&Sha512::digest(material));
        let pair = Self::from_bytes(&digest);
        digest.zeroize();
        pair
    }

    /// Get the AES-256 key.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn encryption_key(&self) -> &[u8; KEY_LENGTH] {
        &self.encryption_key
    }

    /// Get the HMAC-SHA256 key.
    pub fn mac_key(&self) -> &[u8; KEY_LENGTH] {
        &self.mac_key
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        let enc = self.encryption_key.ct_eq(&other.encryption_key);
        let mac = self.mac_key.ct_eq(&other.mac_key);
        (enc & mac).into()
    }
}

impl Eq for KeyPair {}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair([REDACTED])")
    }
}
