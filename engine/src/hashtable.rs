//! The engine's string-to-string attribute table.
//!
//! Used for map config options, web metadata and layer metadata. Keys are
//! compared case-insensitively but keep the spelling they were inserted with.
//! Iteration follows the `first_key` / `next_key` cursor protocol: a cursor is
//! just a key, so it stays meaningful across unrelated insertions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: String,
}

/// Case-insensitive, insertion-ordered attribute table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct HashTable {
    entries: IndexMap<String, Entry>,
    mutations: u64,
}

fn fold(key: &str) -> String {
    key.to_ascii_lowercase()
}

impl HashTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// First key in iteration order, or `None` for an empty table.
    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(_, e)| e.key.as_str())
    }

    /// Key following `key`, or `None` when `key` is the last one or absent.
    pub fn next_key(&self, key: &str) -> Option<&str> {
        let index = self.entries.get_index_of(&fold(key))?;
        self.entries
            .get_index(index + 1)
            .map(|(_, e)| e.key.as_str())
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(&fold(key)).map(|e| e.value.as_str())
    }

    /// Inserts or replaces. A replaced entry keeps its position.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.mutations += 1;
        match self.entries.get_mut(&fold(key)) {
            Some(entry) => entry.value = value.to_owned(),
            None => {
                self.entries.insert(
                    fold(key),
                    Entry {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    },
                );
            }
        }
    }

    /// Removes `key`. Returns `false` (and counts no mutation) if absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.shift_remove(&fold(key)).is_some();
        if removed {
            self.mutations += 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of inserts and effective removals applied since creation.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }
}

impl PartialEq for HashTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, e)| other.entries.get(k).is_some_and(|o| o.value == e.value))
    }
}

impl From<IndexMap<String, String>> for HashTable {
    fn from(map: IndexMap<String, String>) -> Self {
        let mut table = HashTable::new();
        for (key, value) in &map {
            table.insert(key, value);
        }
        table.mutations = 0;
        table
    }
}

impl From<HashTable> for IndexMap<String, String> {
    fn from(table: HashTable) -> Self {
        table
            .entries
            .into_values()
            .map(|e| (e.key, e.value))
            .collect()
    }
}
