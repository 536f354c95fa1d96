//! Key Index implementation
//!
//! HashMap-based index; pure in-memory operations, no I/O.

use std::collections::HashMap;

use crate::record::TypedValue;

use super::KeyLocation;

/// In-memory key → location map
#[derive(Debug, Default)]
pub struct KeyIndex {
    entries: HashMap<TypedValue, KeyLocation>,
    /// Sum of lengths of records replaced by a newer write
    garbage_bytes: u64,
}

impl KeyIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the latest record for `key`
    pub fn get(&self, key: &TypedValue) -> Option<KeyLocation> {
        self.entries.get(key).copied()
    }

    /// Point `key` at a new record, returning the location it replaced
    pub fn put(&mut self, key: TypedValue, location: KeyLocation) -> Option<KeyLocation> {
        let previous = self.entries.insert(key, location);
        if let Some(old) = previous {
            self.garbage_bytes += old.length as u64;
        }
        previous
    }

    pub fn contains(&self, key: &TypedValue) -> bool {
        self.entries.contains_key(key)
    }

    /// Snapshot of all keys, in no particular order
    pub fn keys(&self) -> Vec<TypedValue> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypedValue, &KeyLocation)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes in the log no longer reachable through the index
    pub fn garbage_bytes(&self) -> u64 {
        self.garbage_bytes
    }

    /// Bytes in the log the index still points at
    pub fn live_bytes(&self) -> u64 {
        self.entries.values().map(|loc| loc.length as u64).sum()
    }
}
