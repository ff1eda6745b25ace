//! Item detail resolution.
//!
//! Details are opened with each entry's own key pair. Unlike overviews, a
//! detail that fails to decrypt or parse is dropped with a warning and
//! never fails the unlock.

use rayon::prelude::*;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::entry::Entry;
use keysafe_common::Result;
use keysafe_crypto::{envelope, EnvelopeFormat};
use keysafe_storage::{DetailRecord, ItemId};

/// Attach decrypted details to their entries.
///
/// Details referencing unknown items are skipped. Entries keep their order.
pub fn resolve(entries: Vec<Entry>, details: &[DetailRecord]) -> Vec<Entry> {
    let known: HashSet<ItemId> = entries.iter().map(Entry::id).collect();
    let by_item: HashMap<ItemId, &[u8]> = details
        .iter()
        .filter(|d| known.contains(&d.item_id))
        .map(|d| (d.item_id, d.data.as_slice()))
        .collect();

    let skipped = details.iter().filter(|d| !known.contains(&d.item_id)).count();
    if skipped > 0 {
        debug!(skipped, "Ignoring details of unknown items");
    }

    entries
        .into_par_iter()
        .map(|mut entry| {
            if let Some(data) = by_item.get(&entry.id) {
                entry.detail = match decrypt_detail(&entry, data) {
                    Ok(detail) => Some(detail),
                    Err(e) => {
                        warn!(item_id = entry.id, error = %e, "Dropping undecryptable item detail");
                        None
                    }
                };
            }
            entry
        })
        .collect()
}

fn decrypt_detail(entry: &Entry, data: &[u8]) -> Result<Value> {
    let plaintext = envelope::open(entry.key_pair(), data, EnvelopeFormat::Opdata01)?;
    Ok(serde_json::from_slice(plaintext.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::VaultFixture;
    use crate::hierarchy::KeyHierarchy;
    use crate::index;

    fn entries(fixture: &VaultFixture) -> Vec<Entry> {
        let keys = KeyHierarchy::unlock(b"hunter2", &fixture.profile).unwrap();
        index::build(&fixture.items, &keys).unwrap()
    }

    #[test]
    fn test_resolve_attaches_details() {
        let mut fixture = VaultFixture::new(b"hunter2");
        let shared = fixture.add_shared_item(1, "Shared");
        let keyed = fixture.add_keyed_item(2, "Keyed");
        fixture.add_detail(1, &shared, "one");
        fixture.add_detail(2, &keyed, "two");

        let resolved = resolve(entries(&fixture), &fixture.details);

        assert_eq!(resolved[0].password(), Some("one"));
        assert_eq!(resolved[1].password(), Some("two"));
    }

    #[test]
    fn test_wrong_key_detail_is_absent() {
        let mut fixture = VaultFixture::new(b"hunter2");
        let good = fixture.add_keyed_item(1, "Good");
        fixture.add_keyed_item(2, "Bad");
        fixture.add_detail(1, &good, "fine");
        // Sealed under the wrong item's key.
        fixture.add_detail(2, &good, "unreachable");

        let resolved = resolve(entries(&fixture), &fixture.details);

        assert_eq!(resolved[0].password(), Some("fine"));
        assert!(resolved[1].detail().is_none());
    }

    #[test]
    fn test_corrupt_detail_is_absent() {
        let mut fixture = VaultFixture::new(b"hunter2");
        let key = fixture.add_shared_item(1, "Corrupt");
        fixture.add_detail(1, &key, "lost");
        fixture.details[0].data[0] = b'X';

        let resolved = resolve(entries(&fixture), &fixture.details);
        assert!(resolved[0].detail().is_none());
    }

    #[test]
    fn test_unparseable_detail_is_absent() {
        let mut fixture = VaultFixture::new(b"hunter2");
        let key = fixture.add_shared_item(1, "Garbled");
        let data = keysafe_crypto::seal(&key, b"{not json", EnvelopeFormat::Opdata01).unwrap();
        fixture.details.push(DetailRecord { item_id: 1, data });

        let resolved = resolve(entries(&fixture), &fixture.details);
        assert!(resolved[0].detail().is_none());
    }

    #[test]
    fn test_unknown_item_skipped() {
        let mut fixture = VaultFixture::new(b"hunter2");
        let key = fixture.add_shared_item(1, "Known");
        fixture.add_detail(42, &key, "orphan");

        let resolved = resolve(entries(&fixture), &fixture.details);

        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].detail().is_none());
    }

    #[test]
    fn test_item_without_detail() {
        let mut fixture = VaultFixture::new(b"hunter2");
        fixture.add_shared_item(1, "Bare");

        let resolved = resolve(entries(&fixture), &[]);
        assert!(resolved[0].detail().is_none());
    }
}
