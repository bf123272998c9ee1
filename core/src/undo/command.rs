//! Reversible edits.
//!
//! - [`Editable`]: marker trait for things commands operate on
//! - [`Command`]: a reversible edit with captured before/after state
//! - [`CommandError`] / [`CommandResult`]: failures while applying one
//!
//! Commands are self-contained snapshots: each stores the exact values it
//! writes in both directions, never a diff against whatever the target holds
//! when it is undone.

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::error::DocError;

/// Downcasting support for [`Command::merge`].
///
/// Implemented for every `'static` type.
pub trait AsAny: 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for command targets.
pub trait Editable: 'static {}

/// Why a command could not be applied or reverted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("target not found: {0}")]
    TargetNotFound(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error(transparent)]
    Document(#[from] DocError),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

pub type CommandResult<T = ()> = Result<T, CommandError>;

/// A reversible edit (Command pattern).
///
/// [`redo`](Self::redo) applies the new state and [`undo`](Self::undo)
/// restores the old one. The [`UndoStack`](super::UndoStack) calls `redo`
/// once when the command is pushed.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct SetShapepath {
///     old: String,
///     new: String,
/// }
///
/// impl Command<Document> for SetShapepath {
///     fn redo(&mut self, doc: &mut Document) -> CommandResult {
///         doc.set_shapepath(&self.new);
///         Ok(())
///     }
///
///     fn undo(&mut self, doc: &mut Document) -> CommandResult {
///         doc.set_shapepath(&self.old);
///         Ok(())
///     }
///
///     fn text(&self) -> &str {
///         "Set shapepath"
///     }
///
///     fn is_noop(&self) -> bool {
///         self.old == self.new
///     }
/// }
/// ```
pub trait Command<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the command (forward direction).
    fn redo(&mut self, target: &mut T) -> CommandResult;

    /// Reverts the command. Must restore exactly what `redo` overwrote.
    fn undo(&mut self, target: &mut T) -> CommandResult;

    /// Short label for history menus, e.g. `"Set map name"`.
    fn text(&self) -> &str;

    /// `true` when applying the command would change nothing.
    ///
    /// The stack refuses to record such commands, and drops a command that
    /// becomes a no-op after a [merge](Self::merge).
    fn is_noop(&self) -> bool {
        false
    }

    /// Absorbs `other` into `self` if both edit the same thing.
    ///
    /// Returns `None` when `other` was consumed, `Some(other)` otherwise.
    /// The default never merges.
    fn merge(&mut self, other: Box<dyn Command<T>>) -> Option<Box<dyn Command<T>>> {
        Some(other)
    }
}
