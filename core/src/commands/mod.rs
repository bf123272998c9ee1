//! Undoable edits of a [`Document`].
//!
//! Each command captures the old and new values of exactly what it edits,
//! read from the document when the command is built. Pushing it on an
//! [`UndoStack`](crate::undo::UndoStack) applies it:
//!
//! ```ignore
//! let mut history = doc.new_undo_stack();
//! history.push(Box::new(map::set_name(&doc, "world")), &mut doc)?;
//! history.push(Box::new(AddLayer::new("roads", false)), &mut doc)?;
//! history.undo(&mut doc)?;
//! ```
//!
//! Commands built from a value equal to the current one are no-ops and are
//! not recorded.

mod key_values;
mod layers;
pub mod map;
mod output_formats;

pub use key_values::{RemoveConfigOption, RemoveMetadata, SetConfigOption, SetMetadata};
pub use layers::{AddLayer, RemoveLayer, RenameLayer, UpdateLayer};
pub use map::SetMapValue;
pub use output_formats::{AddOutputFormat, RemoveOutputFormat, UpdateOutputFormat};

use crate::document::Document;
use crate::undo::{CommandError, CommandResult};

fn ensure_loaded(doc: &Document) -> CommandResult {
    if doc.is_loaded() {
        Ok(())
    } else {
        Err(CommandError::InvalidState("no document loaded".into()))
    }
}
