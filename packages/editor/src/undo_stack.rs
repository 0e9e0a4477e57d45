//! # Undo/Redo Stack
//!
//! Linear history with a single cursor over a bounded sequence of entries.
//!
//! ## Design
//!
//! - Entries up to the cursor are applied; entries after it are redoable
//! - Recording a new entry drops the stale redo branch first
//! - When the bound is exceeded the oldest entry is evicted and the cursor
//!   does not advance (the new entry lands on the slot the cursor already
//!   points at)
//! - Undo/redo only move the cursor; replaying the action is the document's
//!   job, and replays are never recorded
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::with_max_levels(50);
//! stack.record(HistoryEntry::now(action));
//!
//! if let Some(entry) = stack.undo_entry() {
//!     entry.action.revert(&mut store);
//! }
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{HistoryAction, HistoryKind};

/// Default number of history entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One recorded, reversible mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub action: HistoryAction,

    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, timestamp: DateTime<Utc>) -> Self {
        Self { action, timestamp }
    }

    pub fn now(action: HistoryAction) -> Self {
        Self::new(action, Utc::now())
    }

    pub fn kind(&self) -> HistoryKind {
        self.action.kind()
    }
}

/// Bounded linear history for document editing
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<HistoryEntry>,

    /// Number of entries currently applied (cursor + 1)
    applied: usize,

    /// Maximum number of entries kept (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a stack with the default bound
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            applied: 0,
            max_levels,
        }
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Record a newly committed entry
    pub fn record(&mut self, entry: HistoryEntry) {
        // New action invalidates the redo branch
        self.entries.truncate(self.applied);
        self.entries.push_back(entry);

        if self.max_levels > 0 && self.entries.len() > self.max_levels {
            self.entries.pop_front();
        } else {
            self.applied += 1;
        }
    }

    /// Step the cursor back, returning the entry to replay in reverse
    pub fn undo_entry(&mut self) -> Option<&HistoryEntry> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.entries.get(self.applied)
    }

    /// Step the cursor forward, returning the entry to replay forward
    pub fn redo_entry(&mut self) -> Option<&HistoryEntry> {
        if self.applied >= self.entries.len() {
            return None;
        }
        self.applied += 1;
        self.entries.get(self.applied - 1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    pub fn undo_levels(&self) -> usize {
        self.applied
    }

    pub fn redo_levels(&self) -> usize {
        self.entries.len() - self.applied
    }

    /// Index of the last applied entry, `None` when nothing is applied
    pub fn cursor(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Entry that the next undo would revert
    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.cursor().and_then(|index| self.entries.get(index))
    }

    /// Entry that the next redo would reapply
    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.applied)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
