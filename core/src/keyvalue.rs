//! Sync between the engine's attribute tables and editor-side maps.
//!
//! The editor keeps config options and metadata as ordered
//! `IndexMap<String, String>`s. Changes go back to the engine one key at a
//! time; the table is never replaced wholesale.
//!
//! None of these functions keep a reference into the table beyond the call.

use indexmap::IndexMap;
use mapedit_engine::HashTable;

/// Ordered string-to-string mapping used for config options and metadata.
pub type KeyValues = IndexMap<String, String>;

/// Reads every entry of `table` by walking its key cursor.
pub fn populate(table: &HashTable) -> KeyValues {
    let mut values = KeyValues::with_capacity(table.len());
    let mut cursor = table.first_key();
    while let Some(key) = cursor {
        if let Some(value) = table.lookup(key) {
            values.insert(key.to_owned(), value.to_owned());
        }
        cursor = table.next_key(key);
    }
    values
}

/// Inserts or replaces `key`. Returns `false` if the value was already set.
pub fn set(table: &mut HashTable, key: &str, value: &str) -> bool {
    if table.lookup(key) == Some(value) {
        return false;
    }
    table.insert(key, value);
    true
}

/// Removes `key`. Returns `false` if it was absent.
pub fn remove(table: &mut HashTable, key: &str) -> bool {
    table.remove(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_reads_all_entries_in_order() {
        let mut table = HashTable::new();
        table.insert("ms_errorfile", "/tmp/ms.log");
        table.insert("proj_lib", "/usr/share/proj");
        table.insert("on_missing_data", "ignore");

        let values = populate(&table);
        let keys: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(keys, ["ms_errorfile", "proj_lib", "on_missing_data"]);
        assert_eq!(values["proj_lib"], "/usr/share/proj");
    }

    #[test]
    fn populate_empty_table() {
        assert!(populate(&HashTable::new()).is_empty());
    }

    #[test]
    fn set_replaces_in_place() {
        let mut table = HashTable::new();
        table.insert("a", "1");
        table.insert("b", "2");
        assert!(set(&mut table, "a", "3"));
        assert_eq!(table.lookup("a"), Some("3"));
        assert_eq!(table.first_key(), Some("a"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn set_same_value_does_not_touch_table() {
        let mut table = HashTable::new();
        table.insert("a", "1");
        let before = table.mutation_count();
        assert!(!set(&mut table, "a", "1"));
        assert_eq!(table.mutation_count(), before);
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let mut table = HashTable::new();
        table.insert("a", "1");
        let before = table.mutation_count();
        assert!(!remove(&mut table, "b"));
        assert_eq!(table.mutation_count(), before);
        assert!(remove(&mut table, "A"));
        assert!(table.is_empty());
    }
}
