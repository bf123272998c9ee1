use super::ensure_loaded;
use crate::document::Document;
use crate::undo::{Command, CommandResult};

/// Which table a key/value command edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    ConfigOptions,
    Metadata,
}

impl Table {
    fn get(self, doc: &Document, key: &str) -> Option<String> {
        let value = match self {
            Table::ConfigOptions => doc.config_option(key),
            Table::Metadata => doc.metadata_value(key),
        };
        value.map(str::to_owned)
    }

    /// Restores `key` to `value`, removing it for `None`.
    fn put(self, doc: &mut Document, key: &str, value: Option<&str>) {
        match (self, value) {
            (Table::ConfigOptions, Some(v)) => doc.set_config_option(key, v),
            (Table::ConfigOptions, None) => doc.remove_config_option(key),
            (Table::Metadata, Some(v)) => doc.set_metadata(key, v),
            (Table::Metadata, None) => doc.remove_metadata(key),
        };
    }
}

/// Shared state of the four key/value commands: one key, its value before
/// and after (`None` meaning absent).
#[derive(Debug)]
struct KeyEdit {
    table: Table,
    key: String,
    old: Option<String>,
    new: Option<String>,
}

impl KeyEdit {
    fn new(table: Table, doc: &Document, key: &str, new: Option<&str>) -> Self {
        let key = key.to_ascii_lowercase();
        Self {
            table,
            old: table.get(doc, &key),
            new: new.map(str::to_owned),
            key,
        }
    }

    fn redo(&self, doc: &mut Document) -> CommandResult {
        ensure_loaded(doc)?;
        self.table.put(doc, &self.key, self.new.as_deref());
        Ok(())
    }

    fn undo(&self, doc: &mut Document) -> CommandResult {
        ensure_loaded(doc)?;
        self.table.put(doc, &self.key, self.old.as_deref());
        Ok(())
    }

    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

macro_rules! key_command {
    ($(#[$doc:meta])* $name:ident, $text:literal) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name(KeyEdit);

        impl Command<Document> for $name {
            fn redo(&mut self, doc: &mut Document) -> CommandResult {
                self.0.redo(doc)
            }

            fn undo(&mut self, doc: &mut Document) -> CommandResult {
                self.0.undo(doc)
            }

            fn text(&self) -> &str {
                $text
            }

            fn is_noop(&self) -> bool {
                self.0.is_noop()
            }
        }

        impl $name {
            pub fn key(&self) -> &str {
                &self.0.key
            }
        }
    };
}

key_command!(
    /// Adds or changes one config option.
    SetConfigOption,
    "Set config option"
);
key_command!(
    /// Removes one config option.
    RemoveConfigOption,
    "Remove config option"
);
key_command!(
    /// Adds or changes one web metadata entry.
    SetMetadata,
    "Set metadata"
);
key_command!(
    /// Removes one web metadata entry.
    RemoveMetadata,
    "Remove metadata"
);

impl SetConfigOption {
    pub fn new(doc: &Document, key: &str, value: &str) -> Self {
        Self(KeyEdit::new(Table::ConfigOptions, doc, key, Some(value)))
    }
}

impl RemoveConfigOption {
    pub fn new(doc: &Document, key: &str) -> Self {
        Self(KeyEdit::new(Table::ConfigOptions, doc, key, None))
    }
}

impl SetMetadata {
    pub fn new(doc: &Document, key: &str, value: &str) -> Self {
        Self(KeyEdit::new(Table::Metadata, doc, key, Some(value)))
    }
}

impl RemoveMetadata {
    pub fn new(doc: &Document, key: &str) -> Self {
        Self(KeyEdit::new(Table::Metadata, doc, key, None))
    }
}
