//! Linear undo/redo history.
//!
//! [`UndoStack`] keeps every recorded command in one vector plus a pointer:
//! commands before the pointer are applied, commands from the pointer on
//! are undone and available for redo. Pushing while the pointer is below the
//! top discards everything above it.
//!
//! ```text
//! push a, b, c          [a b c]^        index 3
//! undo, undo            [a]^[b c]       index 1
//! push d                [a d]^          index 2, b and c discarded
//! ```

use std::fmt;

use super::command::{Command, CommandError, CommandResult, Editable};

/// Default maximum number of undo steps.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// Undo/redo history over a target of type `T`.
///
/// A target may be edited through more than one stack (a settings dialog
/// can keep a private history next to the main window's); each stack only
/// knows about the commands pushed on it.
pub struct UndoStack<T: Editable> {
    commands: Vec<Box<dyn Command<T>>>,
    index: usize,
    limit: usize,
    /// Value of `index` at which the target matched its last save, or
    /// `None` once that point has been discarded from the history.
    clean_index: Option<usize>,
}

impl<T: Editable> UndoStack<T> {
    /// Creates an empty stack keeping at most `limit` commands.
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            limit: limit.max(1),
            clean_index: Some(0),
        }
    }

    /// Applies `command` to `target` and records it.
    ///
    /// Returns `Ok(false)` without touching the target if the command is a
    /// [no-op](Command::is_noop). A command whose `redo` fails is not
    /// recorded.
    pub fn push(&mut self, mut command: Box<dyn Command<T>>, target: &mut T) -> CommandResult<bool> {
        if command.is_noop() {
            log::debug!("ignoring no-op command \"{}\"", command.text());
            return Ok(false);
        }
        command.redo(target)?;

        if self.index < self.commands.len() {
            self.commands.truncate(self.index);
            if self.clean_index.is_some_and(|c| c > self.index) {
                self.clean_index = None;
            }
        }

        // The entry at the clean point describes the saved state; never fold
        // new edits into it.
        if self.index > 0 && self.clean_index != Some(self.index) {
            let top = &mut self.commands[self.index - 1];
            match top.merge(command) {
                None => {
                    if top.is_noop() {
                        self.commands.pop();
                        self.index -= 1;
                    }
                    return Ok(true);
                }
                Some(returned) => command = returned,
            }
        }

        self.commands.push(command);
        self.index += 1;
        if self.commands.len() > self.limit {
            self.commands.remove(0);
            self.index -= 1;
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(c) => Some(c - 1),
            };
        }
        Ok(true)
    }

    /// Reverts the command below the pointer.
    pub fn undo(&mut self, target: &mut T) -> CommandResult {
        if self.index == 0 {
            return Err(CommandError::NothingToUndo);
        }
        self.commands[self.index - 1].undo(target)?;
        self.index -= 1;
        Ok(())
    }

    /// Re-applies the command at the pointer.
    pub fn redo(&mut self, target: &mut T) -> CommandResult {
        if self.index == self.commands.len() {
            return Err(CommandError::NothingToRedo);
        }
        self.commands[self.index].redo(target)?;
        self.index += 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    /// Label of the command [`undo`](Self::undo) would revert.
    pub fn undo_text(&self) -> Option<&str> {
        self.index
            .checked_sub(1)
            .map(|i| self.commands[i].text())
    }

    /// Label of the command [`redo`](Self::redo) would re-apply.
    pub fn redo_text(&self) -> Option<&str> {
        self.commands.get(self.index).map(|c| c.text())
    }

    /// Undo labels, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.commands[..self.index].iter().rev().map(|c| c.text())
    }

    /// Redo labels, next to redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.commands[self.index..].iter().map(|c| c.text())
    }

    /// Total number of recorded commands, applied or not.
    pub fn count(&self) -> usize {
        self.commands.len()
    }

    /// Number of applied commands.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Records the current position as matching the saved document.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.index);
    }

    /// `true` when the target is in the state last marked clean.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.index)
    }

    /// Forgets every command. The target itself is left as it is.
    pub fn clear(&mut self) {
        let was_clean = self.is_clean();
        self.commands.clear();
        self.index = 0;
        self.clean_index = was_clean.then_some(0);
    }
}

impl<T: Editable> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl<T: Editable> fmt::Debug for UndoStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoStack")
            .field("count", &self.commands.len())
            .field("index", &self.index)
            .field("limit", &self.limit)
            .field("clean_index", &self.clean_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Title {
        text: String,
    }

    impl Editable for Title {}

    /// Consecutive retitles merge: the first old value is kept and the
    /// latest new value wins.
    #[derive(Debug)]
    struct Retitle {
        old: String,
        new: String,
    }

    fn retitle(old: &str, new: &str) -> Box<dyn Command<Title>> {
        Box::new(Retitle {
            old: old.into(),
            new: new.into(),
        })
    }

    impl Command<Title> for Retitle {
        fn redo(&mut self, target: &mut Title) -> CommandResult {
            target.text = self.new.clone();
            Ok(())
        }

        fn undo(&mut self, target: &mut Title) -> CommandResult {
            target.text = self.old.clone();
            Ok(())
        }

        fn text(&self) -> &str {
            "Retitle"
        }

        fn is_noop(&self) -> bool {
            self.old == self.new
        }

        fn merge(&mut self, other: Box<dyn Command<Title>>) -> Option<Box<dyn Command<Title>>> {
            if let Some(other) = (*other).as_any().downcast_ref::<Retitle>() {
                self.new = other.new.clone();
                return None;
            }
            Some(other)
        }
    }

    #[derive(Debug)]
    struct Append {
        suffix: String,
    }

    fn append(suffix: &str) -> Box<dyn Command<Title>> {
        Box::new(Append {
            suffix: suffix.into(),
        })
    }

    impl Command<Title> for Append {
        fn redo(&mut self, target: &mut Title) -> CommandResult {
            target.text.push_str(&self.suffix);
            Ok(())
        }

        fn undo(&mut self, target: &mut Title) -> CommandResult {
            let len = target.text.len() - self.suffix.len();
            target.text.truncate(len);
            Ok(())
        }

        fn text(&self) -> &str {
            "Append"
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Command<Title> for Failing {
        fn redo(&mut self, _target: &mut Title) -> CommandResult {
            Err(CommandError::InvalidState("always fails".into()))
        }

        fn undo(&mut self, _target: &mut Title) -> CommandResult {
            Err(CommandError::InvalidState("always fails".into()))
        }

        fn text(&self) -> &str {
            "Failing"
        }
    }

    fn title(text: &str) -> Title {
        Title { text: text.into() }
    }

    #[test]
    fn push_applies_immediately() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        assert!(stack.push(append("a"), &mut t).unwrap());
        assert_eq!(t.text, "a");
        assert_eq!(stack.count(), 1);
        assert_eq!(stack.index(), 1);
    }

    #[test]
    fn undo_then_redo() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        stack.push(append("a"), &mut t).unwrap();
        stack.push(append("b"), &mut t).unwrap();

        stack.undo(&mut t).unwrap();
        stack.undo(&mut t).unwrap();
        assert_eq!(t.text, "");
        assert!(!stack.can_undo());

        stack.redo(&mut t).unwrap();
        stack.redo(&mut t).unwrap();
        assert_eq!(t.text, "ab");
        assert!(!stack.can_redo());
    }

    #[test]
    fn push_below_top_discards_redo_branch() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        stack.push(append("a"), &mut t).unwrap();
        stack.push(append("b"), &mut t).unwrap();
        stack.push(append("c"), &mut t).unwrap();
        stack.undo(&mut t).unwrap();
        stack.undo(&mut t).unwrap();

        stack.push(append("d"), &mut t).unwrap();
        assert_eq!(t.text, "ad");
        assert_eq!(stack.count(), 2);
        assert!(!stack.can_redo());
    }

    #[test]
    fn noop_commands_are_not_recorded() {
        let mut stack = UndoStack::default();
        let mut t = title("same");
        assert!(!stack.push(retitle("same", "same"), &mut t).unwrap());
        assert_eq!(stack.count(), 0);
    }

    #[test]
    fn failed_push_records_nothing() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        assert!(stack.push(Box::new(Failing), &mut t).is_err());
        assert_eq!(stack.count(), 0);
    }

    #[test]
    fn empty_stack_errors() {
        let mut stack = UndoStack::<Title>::default();
        let mut t = title("");
        assert_eq!(stack.undo(&mut t), Err(CommandError::NothingToUndo));
        assert_eq!(stack.redo(&mut t), Err(CommandError::NothingToRedo));
    }

    #[test]
    fn consecutive_compatible_commands_merge() {
        let mut stack = UndoStack::default();
        let mut t = title("a");
        stack.push(retitle("a", "b"), &mut t).unwrap();
        stack.push(retitle("b", "c"), &mut t).unwrap();
        assert_eq!(stack.count(), 1);

        stack.undo(&mut t).unwrap();
        assert_eq!(t.text, "a");
    }

    #[test]
    fn merge_back_to_original_drops_the_entry() {
        let mut stack = UndoStack::default();
        let mut t = title("a");
        stack.push(retitle("a", "b"), &mut t).unwrap();
        stack.push(retitle("b", "a"), &mut t).unwrap();
        assert_eq!(stack.count(), 0);
        assert_eq!(t.text, "a");
    }

    #[test]
    fn different_commands_do_not_merge() {
        let mut stack = UndoStack::default();
        let mut t = title("a");
        stack.push(retitle("a", "b"), &mut t).unwrap();
        stack.push(append("!"), &mut t).unwrap();
        assert_eq!(stack.count(), 2);
    }

    #[test]
    fn limit_drops_oldest() {
        let mut stack = UndoStack::new(2);
        let mut t = title("");
        stack.push(append("a"), &mut t).unwrap();
        stack.push(append("b"), &mut t).unwrap();
        stack.push(append("c"), &mut t).unwrap();
        assert_eq!(stack.count(), 2);

        stack.undo(&mut t).unwrap();
        stack.undo(&mut t).unwrap();
        assert_eq!(t.text, "a");
        assert!(stack.undo(&mut t).is_err());
    }

    #[test]
    fn descriptions_follow_the_pointer() {
        let mut stack = UndoStack::default();
        let mut t = title("x");
        stack.push(append("a"), &mut t).unwrap();
        stack.push(retitle("xa", "y"), &mut t).unwrap();
        assert_eq!(stack.undo_text(), Some("Retitle"));
        assert_eq!(stack.redo_text(), None);

        stack.undo(&mut t).unwrap();
        let undos: Vec<&str> = stack.undo_descriptions().collect();
        let redos: Vec<&str> = stack.redo_descriptions().collect();
        assert_eq!(undos, vec!["Append"]);
        assert_eq!(redos, vec!["Retitle"]);
    }

    #[test]
    fn fresh_stack_is_clean() {
        let stack = UndoStack::<Title>::default();
        assert!(stack.is_clean());
    }

    #[test]
    fn clean_state_survives_undo_redo_round_trip() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        stack.push(append("a"), &mut t).unwrap();
        stack.mark_clean();
        stack.push(append("b"), &mut t).unwrap();
        assert!(!stack.is_clean());

        stack.undo(&mut t).unwrap();
        assert!(stack.is_clean());
        stack.undo(&mut t).unwrap();
        assert!(!stack.is_clean());
        stack.redo(&mut t).unwrap();
        assert!(stack.is_clean());
    }

    #[test]
    fn clean_point_lost_with_discarded_branch() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        stack.push(append("a"), &mut t).unwrap();
        stack.push(append("b"), &mut t).unwrap();
        stack.mark_clean();
        stack.undo(&mut t).unwrap();
        stack.push(append("c"), &mut t).unwrap();

        stack.undo(&mut t).unwrap();
        assert!(!stack.is_clean());
        stack.redo(&mut t).unwrap();
        assert!(!stack.is_clean());
    }

    #[test]
    fn merge_never_folds_into_clean_entry() {
        let mut stack = UndoStack::default();
        let mut t = title("a");
        stack.push(retitle("a", "b"), &mut t).unwrap();
        stack.mark_clean();
        stack.push(retitle("b", "c"), &mut t).unwrap();
        assert_eq!(stack.count(), 2);

        stack.undo(&mut t).unwrap();
        assert_eq!(t.text, "b");
        assert!(stack.is_clean());
    }

    #[test]
    fn clear_keeps_clean_only_at_clean_state() {
        let mut stack = UndoStack::default();
        let mut t = title("");
        stack.push(append("a"), &mut t).unwrap();
        stack.mark_clean();
        stack.clear();
        assert!(stack.is_clean());

        stack.push(append("b"), &mut t).unwrap();
        stack.clear();
        assert!(!stack.is_clean());
    }
}
