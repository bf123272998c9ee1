//! Undo/redo framework.
//!
//! - [`Editable`]: marker trait for things commands operate on
//! - [`Command`]: a reversible edit (Command pattern)
//! - [`UndoStack`]: linear history with truncation, merging and a clean mark
//!
//! The framework knows nothing about mapfiles; the concrete commands for
//! [`Document`](crate::Document) live in [`commands`](crate::commands).

mod command;
mod stack;

pub use command::{AsAny, Command, CommandError, CommandResult, Editable};
pub use stack::{DEFAULT_UNDO_LIMIT, UndoStack};
