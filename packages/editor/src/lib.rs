//! # Blockpad Editor
//!
//! Document state engine for the blockpad block editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ renderer: reads blocks, sends user edits    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document (sole writer of state)     │
//! │  - Block store + ordering index             │
//! │  - Selection / focus                        │
//! │  - Linear undo/redo history                 │
//! │  - Notification bus with state snapshots    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: debounced autosave to a store    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single writer**: only `Document` mutates its containers
//! 2. **No orphans**: every id in the order has a record and vice versa
//! 3. **Whole-operation undo**: one history entry per committed mutation
//! 4. **Snapshots out**: observers receive owned copies, never live references
//!
//! ## Usage
//!
//! ```rust
//! use blockpad_editor::{BlockData, Document};
//!
//! let mut doc = Document::new("Runbook");
//! let a = doc.add_block(BlockData::text("a"), None);
//! let b = doc.add_block(BlockData::text("b"), None);
//!
//! doc.move_block(&b, 0);
//! assert_eq!(doc.block_ids(), vec![b.clone(), a.clone()]);
//!
//! doc.undo();
//! assert_eq!(doc.block_ids(), vec![a, b]);
//! ```

mod block;
mod document;
mod errors;
mod mutations;
mod notifications;
mod ordering;
mod selection;
mod snapshot;
mod store;
mod undo_stack;

pub use block::{
    Attributes, Block, BlockContent, BlockData, BlockId, BlockPatch, DEFAULT_BLOCK_KIND,
};
pub use document::Document;
pub use errors::EditorError;
pub use mutations::{HistoryAction, HistoryKind};
pub use notifications::{ChangeEvent, NotificationBus, Observer, SubscriptionId};
pub use ordering::OrderingIndex;
pub use selection::SelectionState;
pub use snapshot::{
    DocumentMetadata, DocumentState, DocumentStats, SerializedDocument, DEFAULT_TITLE,
    DEFAULT_VERSION_LABEL,
};
pub use store::BlockStore;
pub use undo_stack::{HistoryEntry, UndoStack, DEFAULT_HISTORY_LIMIT};
