//! Key derivation using PBKDF2-HMAC-SHA512.
//!
//! The profile stores a salt and an iteration count; stretching the master
//! password with them yields the top-level key pair that unwraps the rest
//! of the key hierarchy.

use hmac::Hmac;
use sha2::Sha512;
use zeroize::Zeroize;

use crate::keys::{KeyPair, KEY_PAIR_LENGTH};
use keysafe_common::{Error, Result};

/// Derive the top-level key pair from a password.
///
/// Requests 64 bytes of PBKDF2 output; the first 32 become the encryption
/// key and the last 32 the MAC key.
///
/// # Postconditions
/// - The derived key pair is deterministic given the same inputs
///
/// # Errors
/// - Returns error if `iterations` is zero or does not fit in 32 bits
/// - Returns error if the PBKDF2 primitive rejects its parameters
///
/// A wrong password is never detected here; it surfaces later as an
/// authentication failure when the first envelope is opened.
pub fn derive_key_pair(password: &[u8], salt: &[u8], iterations: u64) -> Result<KeyPair> {
    let rounds = u32::try_from(iterations)
        .ok()
        .filter(|&r| r > 0)
        .ok_or_else(|| {
            Error::KeyDerivation(format!("Unsupported iteration count: {}", iterations))
        })?;

    let mut output = [0u8; KEY_PAIR_LENGTH];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, rounds, &mut output)
        .map_err(|e| Error::KeyDerivation(format!("PBKDF2 failed: {}", e)))?;

    let pair = KeyPair::from_bytes(&output);
    output.zeroize();

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_pair_deterministic() {
        let salt = [0u8; 16];

        let key1 = derive_key_pair(b"hunter2", &salt, 2).unwrap();
        let key2 = derive_key_pair(b"hunter2", &salt, 2).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derive_key_pair_different_salt() {
        let key1 = derive_key_pair(b"hunter2", &[1u8; 16], 2).unwrap();
        let key2 = derive_key_pair(b"hunter2", &[2u8; 16], 2).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_derive_key_pair_different_password() {
        let salt = [0u8; 16];

        let key1 = derive_key_pair(b"hunter2", &salt, 2).unwrap();
        let key2 = derive_key_pair(b"hunter3", &salt, 2).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_derive_key_pair_different_iterations() {
        let salt = [0u8; 16];

        let key1 = derive_key_pair(b"hunter2", &salt, 2).unwrap();
        let key2 = derive_key_pair(b"hunter2", &salt, 3).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_matches_pbkdf2_output_split() {
        let salt = b"NaCl";
        let mut expected = [0u8; KEY_PAIR_LENGTH];
        pbkdf2::pbkdf2::<Hmac<Sha512>>(b"password", salt, 1, &mut expected).unwrap();

        let pair = derive_key_pair(b"password", salt, 1).unwrap();

        assert_eq!(pair.encryption_key(), &expected[..32]);
        assert_eq!(pair.mac_key(), &expected[32..]);
    }

    #[test]
    fn test_empty_password_is_accepted() {
        assert!(derive_key_pair(b"", &[0u8; 16], 1).is_ok());
    }

    #[test]
    fn test_zero_iterations_fails() {
        let err = derive_key_pair(b"hunter2", &[0u8; 16], 0).unwrap_err();
        assert!(matches!(err, Error::KeyDerivation(_)));
    }

    #[test]
    fn test_oversized_iterations_fails() {
        let err = derive_key_pair(b"hunter2", &[0u8; 16], u64::from(u32::MAX) + 1).unwrap_err();
        assert!(matches!(err, Error::KeyDerivation(_)));
    }
}
