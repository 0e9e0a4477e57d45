//! # Document State Engine
//!
//! The authoritative model of one block document and the only writer of its
//! state. A `Document` exclusively owns:
//! - the keyed block store and the ordering index
//! - the selection/focus tracker
//! - the undo/redo history
//! - the notification bus
//!
//! ## Commit cycle
//!
//! ```text
//! mutation → store + index → history entry → observers (event + snapshot)
//! ```
//!
//! Every public mutation runs to completion before any observer runs.
//! Operations on a missing block return `false` and leave state untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::snapshot::generate_document_id;
use crate::{
    Block, BlockData, BlockId, BlockPatch, BlockStore, ChangeEvent, DocumentMetadata,
    DocumentState, DocumentStats, EditorError, HistoryAction, HistoryEntry, NotificationBus,
    SelectionState, SerializedDocument, SubscriptionId, UndoStack, DEFAULT_TITLE,
    DEFAULT_VERSION_LABEL,
};

/// Editable block document
#[derive(Debug)]
pub struct Document {
    id: String,
    title: String,
    version: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    metadata: DocumentMetadata,

    store: BlockStore,
    selection: SelectionState,
    history: UndoStack,
    bus: NotificationBus,
}

impl Document {
    /// Create an empty document with a fresh identity
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_document_id(),
            title: title.into(),
            version: DEFAULT_VERSION_LABEL.to_string(),
            created_at: now,
            updated_at: now,
            metadata: DocumentMetadata::default(),
            store: BlockStore::new(),
            selection: SelectionState::new(),
            history: UndoStack::new(),
            bus: NotificationBus::new(),
        }
    }

    /// Replace the history bound (0 = unlimited). Drops existing history.
    pub fn with_history_limit(mut self, max_levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(max_levels);
        self
    }

    /// Build a document from a serialized record without recording history
    pub fn from_serialized(data: SerializedDocument) -> Self {
        let mut doc = Self::new(DEFAULT_TITLE);
        doc.deserialize(data);
        doc
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(Self::from_serialized(serde_json::from_str(json)?))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EditorError> {
        Ok(Self::from_serialized(serde_json::from_slice(bytes)?))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version_label(&self) -> &str {
        &self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get_block(&self, id: &BlockId) -> Option<&Block> {
        self.store.get(id)
    }

    /// Blocks in document order
    pub fn get_blocks(&self) -> Vec<&Block> {
        self.store.iter().collect()
    }

    pub fn iter_blocks(&self) -> impl Iterator<Item = &Block> {
        self.store.iter()
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        self.store.order().iter().cloned().collect()
    }

    pub fn position_of(&self, id: &BlockId) -> Option<usize> {
        self.store.position(id)
    }

    pub fn blocks_of_kind(&self, kind: &str) -> Vec<&Block> {
        self.store.iter().filter(|block| block.kind == kind).collect()
    }

    pub fn selected_blocks(&self) -> Vec<BlockId> {
        self.selection.selected_ids()
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn focused_block(&self) -> Option<&BlockId> {
        self.selection.focused()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True when the block store and ordering index agree
    pub fn is_consistent(&self) -> bool {
        self.store.is_consistent()
    }

    pub fn get_stats(&self) -> DocumentStats {
        let mut kinds = BTreeMap::new();
        let mut total_content_length = 0;

        for block in self.store.iter() {
            *kinds.entry(block.kind.clone()).or_insert(0) += 1;
            total_content_length += block.content.len();
        }

        DocumentStats {
            block_count: self.store.len(),
            kinds,
            total_content_length,
            created_at: self.created_at,
            updated_at: self.updated_at,
            history_len: self.history.len(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Owned snapshot of the current state
    pub fn state(&self) -> DocumentState {
        DocumentState {
            document: self.serialize(),
            selected_blocks: self.selection.selected_ids(),
            focused_block: self.selection.focused().cloned(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            history_len: self.history.len(),
        }
    }

    // =========================================================================
    // Block mutations
    // =========================================================================

    /// Insert a new block and return its id.
    ///
    /// The block goes to `position` when `position <= len`, otherwise it is
    /// appended. A caller-supplied id that is blank or already taken is
    /// replaced by a generated one.
    pub fn add_block(&mut self, mut data: BlockData, position: Option<usize>) -> BlockId {
        let id = match data.id.take() {
            Some(id) if id.as_str().trim().is_empty() => BlockId::generate(),
            Some(id) if self.store.contains(&id) => {
                tracing::warn!(block = %id, "block id already in use, generating a new one");
                BlockId::generate()
            }
            Some(id) => id,
            None => BlockId::generate(),
        };

        let now = self.touch();
        let block = data.into_block(id.clone(), now);
        let position = self.store.insert(block.clone(), position);
        self.record(HistoryAction::Add { block, position }, now);

        self.emit(ChangeEvent::BlockAdded {
            block_id: id.clone(),
        });
        id
    }

    /// Delete a block, purging it from selection and focus
    pub fn remove_block(&mut self, id: &BlockId) -> bool {
        let Some((block, position)) = self.store.remove(id) else {
            return false;
        };

        self.selection.purge(id);
        let now = self.touch();
        self.record(HistoryAction::Remove { block, position }, now);

        self.emit(ChangeEvent::BlockRemoved {
            block_id: id.clone(),
        });
        true
    }

    /// Merge `patch` over an existing block
    pub fn update_block(&mut self, id: &BlockId, patch: BlockPatch) -> bool {
        if !self.store.contains(id) {
            return false;
        }

        let now = self.touch();
        let Some(block) = self.store.get_mut(id) else {
            return false;
        };
        let before = block.clone();
        block.apply_patch(&patch, now);
        let after = block.clone();

        self.record(
            HistoryAction::Update {
                block_id: id.clone(),
                before,
                after,
            },
            now,
        );

        self.emit(ChangeEvent::BlockUpdated {
            block_id: id.clone(),
            partial_fields: patch,
        });
        true
    }

    /// Relocate a block within the ordering index.
    ///
    /// Out-of-range positions are clamped to the end.
    pub fn move_block(&mut self, id: &BlockId, new_position: usize) -> bool {
        let Some((from, to)) = self.store.relocate(id, new_position) else {
            return false;
        };

        if to != new_position {
            tracing::debug!(block = %id, requested = new_position, to, "move position clamped");
        }

        let now = self.touch();
        self.record(
            HistoryAction::Move {
                block_id: id.clone(),
                from,
                to,
            },
            now,
        );

        self.emit(ChangeEvent::BlockMoved {
            block_id: id.clone(),
            from,
            to,
        });
        true
    }

    // =========================================================================
    // Selection and focus
    // =========================================================================

    /// Select a block. The id is not validated.
    pub fn select_block(&mut self, id: impl Into<BlockId>, multi_select: bool) {
        self.selection.select(id.into(), multi_select);
        self.emit_selection();
    }

    pub fn deselect_block(&mut self, id: &BlockId) -> bool {
        let removed = self.selection.deselect(id);
        self.emit_selection();
        removed
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.emit_selection();
    }

    /// Focus a block. The id is not validated.
    pub fn focus_block(&mut self, id: impl Into<BlockId>) {
        self.selection.focus(id.into());
        self.emit(ChangeEvent::FocusChanged {
            focused_block: self.selection.focused().cloned(),
        });
    }

    pub fn blur(&mut self) {
        self.selection.blur();
        self.emit(ChangeEvent::FocusChanged {
            focused_block: None,
        });
    }

    fn emit_selection(&mut self) {
        self.emit(ChangeEvent::SelectionChanged {
            selected_blocks: self.selection.selected_ids(),
        });
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Revert the entry at the history cursor
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo_entry().cloned() else {
            return false;
        };

        self.replay(&entry, false);
        self.emit(ChangeEvent::Undo {
            history_item: entry,
        });
        true
    }

    /// Reapply the entry after the history cursor
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo_entry().cloned() else {
            return false;
        };

        self.replay(&entry, true);
        self.emit(ChangeEvent::Redo {
            history_item: entry,
        });
        true
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.emit(ChangeEvent::HistoryCleared);
    }

    fn replay(&mut self, entry: &HistoryEntry, forward: bool) {
        let applied = if forward {
            entry.action.apply(&mut self.store)
        } else {
            entry.action.revert(&mut self.store)
        };

        let id = entry.action.block_id();
        if !applied {
            tracing::warn!(
                block = %id,
                action = %entry.kind(),
                forward,
                "history entry did not match document state"
            );
        }
        if !self.store.contains(id) {
            self.selection.purge(id);
        }
        self.touch();
    }

    fn record(&mut self, action: HistoryAction, now: DateTime<Utc>) {
        self.history.record(HistoryEntry::new(action, now));
    }

    // =========================================================================
    // Document info
    // =========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
        self.emit(ChangeEvent::DocumentInfoChanged);
    }

    pub fn set_version_label(&mut self, version: impl Into<String>) {
        self.version = version.into();
        self.touch();
        self.emit(ChangeEvent::DocumentInfoChanged);
    }

    pub fn update_metadata(&mut self, update: impl FnOnce(&mut DocumentMetadata)) {
        update(&mut self.metadata);
        self.touch();
        self.emit(ChangeEvent::DocumentInfoChanged);
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        if !self.metadata.tags.insert(tag.into()) {
            return false;
        }
        self.touch();
        self.emit(ChangeEvent::DocumentInfoChanged);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        if !self.metadata.tags.remove(tag) {
            return false;
        }
        self.touch();
        self.emit(ChangeEvent::DocumentInfoChanged);
        true
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Persistable record; selection, focus and history are excluded
    pub fn serialize(&self) -> SerializedDocument {
        SerializedDocument {
            id: self.id.clone(),
            title: self.title.clone(),
            version: self.version.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            metadata: self.metadata.clone(),
            blocks: self.store.iter().cloned().collect(),
        }
    }

    /// Replace the whole document with `data`.
    ///
    /// Bulk load bypasses history: history, selection and focus are reset and
    /// observers get a single `document-loaded` event. Blocks whose id was
    /// already loaded are skipped.
    pub fn deserialize(&mut self, data: SerializedDocument) {
        self.id = if data.id.trim().is_empty() {
            generate_document_id()
        } else {
            data.id
        };
        self.title = data.title;
        self.version = data.version;
        self.created_at = data.created_at;
        self.updated_at = data.updated_at.max(data.created_at);
        self.metadata = data.metadata;

        self.store.clear();
        self.selection.reset();
        self.history.clear();

        for block in data.blocks {
            let block = block.normalized();
            if self.store.contains(&block.id) {
                tracing::warn!(block = %block.id, "duplicate block id in document data, skipping");
                continue;
            }
            self.store.insert(block, None);
        }

        self.emit(ChangeEvent::DocumentLoaded {
            block_count: self.store.len(),
        });
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Parse `json` and load it in place
    pub fn load_json(&mut self, json: &str) -> Result<(), EditorError> {
        let data: SerializedDocument = serde_json::from_str(json)?;
        self.deserialize(data);
        Ok(())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent, &DocumentState) -> anyhow::Result<()> + Send + 'static,
    {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.len()
    }

    /// Advance `updated_at` without ever moving it backwards
    fn touch(&mut self) -> DateTime<Utc> {
        self.updated_at = Utc::now().max(self.updated_at);
        self.updated_at
    }

    fn emit(&mut self, event: ChangeEvent) {
        tracing::debug!(
            document = %self.id,
            event = event.kind(),
            blocks = self.store.len(),
            "change committed"
        );

        if self.bus.is_empty() {
            return;
        }
        let state = self.state();
        self.bus.notify(&event, &state);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}
