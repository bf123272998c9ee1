use mapedit_engine::OutputFormatObj;

use super::ensure_loaded;
use crate::document::Document;
use crate::output_format::OutputFormat;
use crate::undo::{Command, CommandError, CommandResult};

fn missing(name: &str) -> CommandError {
    CommandError::TargetNotFound(format!("output format {name}"))
}

#[derive(Debug)]
pub struct AddOutputFormat {
    format: OutputFormat,
}

impl AddOutputFormat {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Command<Document> for AddOutputFormat {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        doc.add_output_format(&self.format)?;
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        if !doc.remove_output_format(&self.format.name) {
            return Err(missing(&self.format.name));
        }
        Ok(())
    }

    fn text(&self) -> &str {
        "Add output format"
    }
}

/// Replaces an output format, possibly renaming it.
#[derive(Debug)]
pub struct UpdateOutputFormat {
    old: OutputFormat,
    new: OutputFormat,
}

impl UpdateOutputFormat {
    /// `edited` is a copy obtained from
    /// [`Document::get_output_format`] and then modified.
    pub fn new(doc: &Document, edited: OutputFormat) -> CommandResult<Self> {
        let old = doc
            .get_output_format(edited.original_name())
            .ok_or_else(|| missing(edited.original_name()))?;
        Ok(Self { old, new: edited })
    }

    fn apply(doc: &mut Document, format: &OutputFormat) -> CommandResult {
        ensure_loaded(doc)?;
        if !doc.update_output_format(format)?
            && !doc.output_format_exists(format.original_name())
        {
            return Err(missing(format.original_name()));
        }
        Ok(())
    }
}

impl Command<Document> for UpdateOutputFormat {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        Self::apply(doc, &self.new.rebased(&self.old.name))
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        Self::apply(doc, &self.old.rebased(&self.new.name))
    }

    fn text(&self) -> &str {
        "Edit output format"
    }

    fn is_noop(&self) -> bool {
        self.old.committed() == self.new.committed()
    }
}

/// Removes an output format. Undo puts the engine object back as it was,
/// at its old position.
#[derive(Debug)]
pub struct RemoveOutputFormat {
    name: String,
    removed: Option<(usize, OutputFormatObj)>,
}

impl RemoveOutputFormat {
    pub fn new(doc: &Document, name: &str) -> CommandResult<Self> {
        if !doc.output_format_exists(name) {
            return Err(missing(name));
        }
        Ok(Self {
            name: name.to_owned(),
            removed: None,
        })
    }
}

impl Command<Document> for RemoveOutputFormat {
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        ensure_loaded(doc)?;
        let removed = doc
            .take_output_format(&self.name)
            .ok_or_else(|| missing(&self.name))?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        let (index, obj) = self
            .removed
            .clone()
            .ok_or_else(|| CommandError::InvalidState("output format was never removed".into()))?;
        doc.restore_output_format(index, obj)?;
        self.removed = None;
        Ok(())
    }

    fn text(&self) -> &str {
        "Remove output format"
    }
}
