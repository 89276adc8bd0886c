//! KeyDir implementation
//!
//! HashMap-based key directory.

use std::collections::HashMap;

use super::IndexEntry;

/// Maps each live key to its latest [`IndexEntry`]
#[derive(Debug, Default)]
pub struct KeyDir {
    entries: HashMap<Vec<u8>, IndexEntry>,
}

impl KeyDir {
    /// Create a new empty KeyDir
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `key`
    ///
    /// No ordering check is done here; callers feed entries oldest-first.
    /// Returns the entry that was replaced, if any.
    pub fn upsert(&mut self, key: Vec<u8>, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(key, entry)
    }

    /// Look up the current entry for `key`
    pub fn lookup(&self, key: &[u8]) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all keys and entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &IndexEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }
}
