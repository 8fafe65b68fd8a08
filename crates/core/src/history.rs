//! # Undo/Redo History
//!
//! Snapshot history over immutable documents.
//!
//! ```text
//! past (oldest .. newest)   present   future (next .. furthest)
//! ```
//!
//! - `commit` pushes the present onto `past`, evicting the oldest entry once
//!   the limit is exceeded, and clears `future`
//! - `undo` moves the newest `past` entry into the present
//! - `redo` moves the first `future` entry into the present; only `commit`
//!   enforces the limit
//! - Underflow on either side is a no-op that reports `false`

use std::collections::VecDeque;

/// Default number of undo levels kept by `commit`.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Linear undo/redo history of whole-document snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    /// Previous snapshots, oldest first.
    past: VecDeque<T>,

    present: T,

    /// Undone snapshots, next redo first.
    future: VecDeque<T>,

    /// Maximum length of `past` after a commit.
    limit: usize,
}

impl<T> History<T> {
    /// Create a history with no past or future.
    pub fn new(present: T) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Set a custom undo limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1); // At least one undo level
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self
    }

    /// The current document.
    pub fn present(&self) -> &T {
        &self.present
    }

    /// Replace the present with `next`, recording the old present for undo.
    ///
    /// Any redo history is discarded.
    pub fn commit(&mut self, next: T) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);

        while self.past.len() > self.limit {
            self.past.pop_front();
        }

        self.future.clear();
    }

    /// Step back one snapshot. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };

        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one snapshot. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };

        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        true
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of snapshots available to undo.
    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    /// Number of snapshots available to redo.
    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Configured undo limit.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
