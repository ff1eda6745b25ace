//! Cryptographic primitives for Keysafe.
//!
//! This module provides:
//! - Key derivation using PBKDF2-HMAC-SHA512
//! - The `opdata01` envelope codec (AES-256-CBC with an HMAC-SHA256 tag)
//! - Key pairs with automatic zeroization
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - MAC tags and key pairs are compared in constant time

pub mod envelope;
pub mod kdf;
pub mod keys;

pub use envelope::{open, EnvelopeFormat, MAGIC};
pub use kdf::derive_key_pair;
pub use keys::{KeyPair, KEY_LENGTH, KEY_PAIR_LENGTH};

#[cfg(any(test, feature = "test-util"))]
pub use envelope::seal;
