//! Title lookup over the decrypted index.

use keysafe_common::{Error, Result};
use keysafe_storage::ItemId;

use crate::entry::Entry;

/// Immutable index of decrypted entries.
///
/// Built once at the end of unlock and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct VaultIndex {
    entries: Vec<Entry>,
}

impl VaultIndex {
    /// Wrap fully resolved entries.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// All entries whose overview title equals `title` exactly.
    ///
    /// Matching is byte-for-byte: case and whitespace are significant.
    ///
    /// # Errors
    /// - `NoMatch` if no entry has that title
    pub fn search(&self, title: &str) -> Result<Vec<&Entry>> {
        let matches: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|entry| entry.title() == Some(title))
            .collect();

        if matches.is_empty() {
            return Err(Error::NoMatch(title.to_string()));
        }
        Ok(matches)
    }

    /// Look up an entry by item id.
    pub fn get(&self, id: ItemId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Titles of every entry that has one.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(Entry::title)
    }

    /// Every entry, in item order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
