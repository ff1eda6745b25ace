//! Item overview decryption.
//!
//! Every item's overview is opened with the overview key pair and its own
//! key pair is unwrapped with the master key pair. Items are independent,
//! so the work fans out across the rayon pool; collecting the results is
//! the join barrier. Any single failure fails the whole build.

use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use crate::entry::Entry;
use crate::hierarchy::KeyHierarchy;
use keysafe_common::{Error, Result};
use keysafe_crypto::{envelope, EnvelopeFormat, KeyPair};
use keysafe_storage::ItemRecord;

/// Decrypt the overview and key of every item.
///
/// Entries come back in input order with no detail attached.
///
/// # Errors
/// - Any envelope error from an overview or item key
/// - `Serialization` if an overview is not valid JSON
/// - `InvalidInput` if two items share an id, or an item key is not
///   64 bytes
pub fn build(items: &[ItemRecord], keys: &KeyHierarchy) -> Result<Vec<Entry>> {
    let mut seen = HashSet::with_capacity(items.len());
    if let Some(dup) = items.iter().find(|item| !seen.insert(item.id)) {
        return Err(Error::InvalidInput(format!("Duplicate item id {}", dup.id)));
    }

    let entries = items
        .par_iter()
        .map(|item| decrypt_item(item, keys))
        .collect::<Result<Vec<_>>>()?;

    debug!(count = entries.len(), "Decrypted item overviews");
    Ok(entries)
}

fn decrypt_item(item: &ItemRecord, keys: &KeyHierarchy) -> Result<Entry> {
    let overview = envelope::open(keys.overview(), &item.overview_data, EnvelopeFormat::Bare)?;
    let overview = serde_json::from_slice(overview.as_bytes())?;
    let key_pair = item_key_pair(item, keys)?;

    Ok(Entry::new(item.id, key_pair, overview))
}

/// Resolve the key pair protecting an item's detail.
///
/// Items without key data share the overview key pair. Otherwise the
/// unwrapped material is already a full key pair and is split without
/// hashing.
pub fn item_key_pair(item: &ItemRecord, keys: &KeyHierarchy) -> Result<KeyPair> {
    if item.key_data.is_empty() {
        return Ok(keys.overview().clone());
    }

    let raw = envelope::open(keys.master(), &item.key_data, EnvelopeFormat::Bare)?;
    if raw.is_empty() {
        return Ok(keys.overview().clone());
    }
    KeyPair::split(raw.as_bytes())
}
