//! Structural and attribute edits of layers. Layers are referred to by
//! name only; indices are resolved by the document at apply time.

use super::ensure_loaded;
use crate::document::Document;
use crate::layer::Layer;
use crate::undo::{Command, CommandError, CommandResult};

fn missing(name: &str) -> CommandError {
    CommandError::TargetNotFound(format!("layer {name}"))
}

/// Adds a new layer.
///
/// Undo removes it again and keeps a snapshot, so a later redo restores the
/// layer with every attribute it had, not a fresh default one.
#[derive(Debug)]
pub struct AddLayer {
    name: String,
    is_raster: bool,
    snapshot: Option<Layer>,
}

impl AddLayer {
    pub fn new(name: impl Into<String>, is_raster: bool) -> Self {
        Self {
            name: name.into(),
            is_raster,
            snapshot: None,
        }
    }
}

impl Command<Document> for AddLayer {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        match &self.snapshot {
            Some(layer) => doc.restore_layer(layer)?,
            None => {
                doc.add_layer(&self.name, self.is_raster)?;
            }
        }
        self.snapshot = None;
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        let removed = doc.remove_layer(&self.name).ok_or_else(|| missing(&self.name))?;
        self.snapshot = Some(removed);
        Ok(())
    }

    fn text(&self) -> &str {
        "Add layer"
    }
}

/// Removes a layer. Undo appends it back with all of its attributes.
#[derive(Debug)]
pub struct RemoveLayer {
    name: String,
    removed: Option<Layer>,
}

impl RemoveLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            removed: None,
        }
    }
}

impl Command<Document> for RemoveLayer {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        ensure_loaded(doc)?;
        let removed = doc.remove_layer(&self.name).ok_or_else(|| missing(&self.name))?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        let layer = self
            .removed
            .as_ref()
            .ok_or_else(|| CommandError::InvalidState("layer was never removed".into()))?;
        doc.restore_layer(layer)?;
        self.removed = None;
        Ok(())
    }

    fn text(&self) -> &str {
        "Remove layer"
    }
}

/// Replaces the attributes of one layer.
#[derive(Debug)]
pub struct UpdateLayer {
    old: Layer,
    new: Layer,
}

impl UpdateLayer {
    /// Captures the document's current version of `edited` as the undo
    /// state.
    pub fn new(doc: &Document, edited: Layer) -> CommandResult<Self> {
        let old = doc
            .layer(edited.name())
            .cloned()
            .ok_or_else(|| missing(edited.name()))?;
        Ok(Self { old, new: edited })
    }
}

impl Command<Document> for UpdateLayer {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        doc.update_layer(&self.new)?;
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        doc.update_layer(&self.old)?;
        Ok(())
    }

    fn text(&self) -> &str {
        "Edit layer"
    }

    fn is_noop(&self) -> bool {
        self.old == self.new
    }

    fn merge(
        &mut self,
        other: Box<dyn Command<Document>>,
    ) -> Option<Box<dyn Command<Document>>> {
        if let Some(other) = (*other).as_any().downcast_ref::<Self>()
            && other.new.name() == self.new.name()
        {
            self.new = other.new.clone();
            return None;
        }
        Some(other)
    }
}

#[derive(Debug)]
pub struct RenameLayer {
    old: String,
    new: String,
}

impl RenameLayer {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl Command<Document> for RenameLayer {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        doc.rename_layer(&self.old, &self.new)?;
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        doc.rename_layer(&self.new, &self.old)?;
        Ok(())
    }

    fn text(&self) -> &str {
        "Rename layer"
    }

    fn is_noop(&self) -> bool {
        self.old == self.new
    }
}
