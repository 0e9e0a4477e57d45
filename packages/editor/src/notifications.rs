//! # Change Notifications
//!
//! Observers registered on the [`NotificationBus`] are invoked synchronously
//! after every committed mutation, in registration order, with a
//! [`ChangeEvent`] and an owned [`DocumentState`] snapshot.
//!
//! ## Fault isolation
//!
//! An observer that returns an error or panics is logged and skipped; the
//! remaining observers still run and engine state is untouched.
//!
//! ## Re-entrancy
//!
//! Observers only ever see the event and the snapshot, and the document is
//! mutably borrowed for the whole notification cycle, so an observer has no
//! direct path back into the engine. An observer that captures some other
//! route to the same document (a shared handle behind a lock) must not mutate
//! through it: the nested call re-enters the writer lock and deadlocks.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::{BlockId, BlockPatch, DocumentState, HistoryEntry};

/// Description of what a committed mutation changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeEvent {
    #[serde(rename_all = "camelCase")]
    BlockAdded { block_id: BlockId },

    #[serde(rename_all = "camelCase")]
    BlockRemoved { block_id: BlockId },

    #[serde(rename_all = "camelCase")]
    BlockUpdated {
        block_id: BlockId,
        partial_fields: BlockPatch,
    },

    #[serde(rename_all = "camelCase")]
    BlockMoved {
        block_id: BlockId,
        from: usize,
        to: usize,
    },

    #[serde(rename_all = "camelCase")]
    SelectionChanged { selected_blocks: Vec<BlockId> },

    #[serde(rename_all = "camelCase")]
    FocusChanged { focused_block: Option<BlockId> },

    #[serde(rename_all = "camelCase")]
    Undo { history_item: HistoryEntry },

    #[serde(rename_all = "camelCase")]
    Redo { history_item: HistoryEntry },

    #[serde(rename_all = "camelCase")]
    DocumentLoaded { block_count: usize },

    DocumentInfoChanged,

    HistoryCleared,
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::BlockAdded { .. } => "block-added",
            ChangeEvent::BlockRemoved { .. } => "block-removed",
            ChangeEvent::BlockUpdated { .. } => "block-updated",
            ChangeEvent::BlockMoved { .. } => "block-moved",
            ChangeEvent::SelectionChanged { .. } => "selection-changed",
            ChangeEvent::FocusChanged { .. } => "focus-changed",
            ChangeEvent::Undo { .. } => "undo",
            ChangeEvent::Redo { .. } => "redo",
            ChangeEvent::DocumentLoaded { .. } => "document-loaded",
            ChangeEvent::DocumentInfoChanged => "document-info-changed",
            ChangeEvent::HistoryCleared => "history-cleared",
        }
    }
}

/// Observer callback
pub type Observer = Box<dyn FnMut(&ChangeEvent, &DocumentState) -> anyhow::Result<()> + Send>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Synchronous observer dispatch
#[derive(Default)]
pub struct NotificationBus {
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent, &DocumentState) -> anyhow::Result<()> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Run every observer in registration order.
    ///
    /// Returns the number of observers that failed.
    pub fn notify(&mut self, event: &ChangeEvent, state: &DocumentState) -> usize {
        let mut failures = 0;

        for (id, observer) in &mut self.observers {
            match catch_unwind(AssertUnwindSafe(|| observer(event, state))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    tracing::warn!(
                        subscription = id.0,
                        event = event.kind(),
                        "observer failed: {err:#}"
                    );
                }
                Err(payload) => {
                    failures += 1;
                    tracing::error!(
                        subscription = id.0,
                        event = event.kind(),
                        "observer panicked: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        failures
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("observers", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
