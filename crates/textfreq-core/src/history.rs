//! Bounded undo/redo history of whole-document snapshots.
//!
//! ## State machine
//!
//! The document is `Clean` while the current text equals the original and
//! no snapshot exists, `Dirty` otherwise. Every text-altering operation
//! calls [`History::record`] first; `record` clears the redo stack, so a
//! redo is only possible immediately after one or more undos.
//!
//! A quirk inherited from the reference behavior: recording from a clean
//! state pushes nothing (there is nothing older to return to than the
//! original, which restart covers), so the very first mutation of a
//! pristine document is recoverable only through restart.

use serde::{Deserialize, Serialize};

/// Maximum retained snapshots per stack.
pub const HISTORY_CAPACITY: usize = 50;

/// Undo/redo stacks of document snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    undo: Vec<String>,
    redo: Vec<String>,
}

impl History {
    /// Create empty stacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted stacks.
    #[must_use]
    pub fn from_parts(undo: Vec<String>, redo: Vec<String>) -> Self {
        Self { undo, redo }
    }

    /// Undo stack, oldest first.
    #[must_use]
    pub fn undo_stack(&self) -> &[String] {
        &self.undo
    }

    /// Redo stack, oldest first.
    #[must_use]
    pub fn redo_stack(&self) -> &[String] {
        &self.redo
    }

    /// Whether a redo is currently possible.
    #[must_use]
    pub fn has_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Snapshot `current` ahead of a mutation.
    ///
    /// Clears the redo stack. Pushes `current` unless it equals the top
    /// snapshot, or unless the stack is empty and `current` still equals
    /// `original` (the clean-state quirk). The oldest snapshot is dropped
    /// once the stack passes [`HISTORY_CAPACITY`].
    pub fn record(&mut self, current: &str, original: &str) {
        self.redo.clear();
        if self.undo.is_empty() {
            if current != original {
                self.undo.push(current.to_string());
            }
        } else if self.undo.last().map(String::as_str) != Some(current) {
            self.undo.push(current.to_string());
            if self.undo.len() > HISTORY_CAPACITY {
                self.undo.remove(0);
            }
        }
    }

    /// Pop the most recent snapshot, parking `current` on the redo stack.
    ///
    /// Returns the text to restore, or `None` when there is nothing to
    /// undo.
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let snapshot = self.undo.pop()?;
        self.redo.push(current.to_string());
        Some(snapshot)
    }

    /// Pop the most recent redo entry, parking `current` on the undo
    /// stack.
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let snapshot = self.redo.pop()?;
        self.undo.push(current.to_string());
        Some(snapshot)
    }
}


#[cfg(kani)]
mod proofs {
    use super::*;

    /// The undo stack never exceeds its capacity.
    #[kani::proof]
    #[kani::unwind(8)]
    fn record_respects_capacity() {
        let mut history = History::new();
        let rounds: usize = kani::any();
        kani::assume(rounds <= 6);
        for i in 0..rounds {
            history.record(&format!("{i}"), "original");
        }
        kani::assert(
            history.undo_stack().len() <= HISTORY_CAPACITY,
            "undo stack exceeds capacity",
        );
        kani::assert(history.redo_stack().is_empty(), "record must clear redo");
    }
}
