//! Vault engine for Keysafe.
//!
//! This module provides:
//! - Unwrapping of the key hierarchy (top, master, overview, per-item)
//! - Decryption of item overviews into a searchable index
//! - Best-effort decryption of item details
//! - A vault handle with a single readiness gate for all callers
//!
//! # Architecture
//! Unlock is one pipeline with strictly ordered stages: profile fetch, key
//! derivation, hierarchy unwrap, overview decryption, detail resolution.
//! The resulting [`VaultIndex`] is immutable and shared without locking.

pub mod config;
pub mod detail;
pub mod entry;
pub mod hierarchy;
pub mod index;
pub mod manager;
pub mod search;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::VaultConfig;
pub use entry::Entry;
pub use hierarchy::KeyHierarchy;
pub use search::VaultIndex;
pub use session::Vault;
