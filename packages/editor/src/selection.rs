//! # Selection and Focus
//!
//! Tracks which blocks are selected (multi-select allowed) and which single
//! block has focus.
//!
//! The tracker does not check that ids exist. A UI event can reference a
//! block that is mid-removal; such ids simply stay inert. The document engine
//! calls [`SelectionState::purge`] whenever a block leaves the store, which is
//! what keeps selection and focus consistent with the block store.

use std::collections::BTreeSet;

use crate::BlockId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<BlockId>,
    focused: Option<BlockId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a block; without `multi_select` the previous selection is dropped
    pub fn select(&mut self, id: BlockId, multi_select: bool) {
        if !multi_select {
            self.selected.clear();
        }
        self.selected.insert(id);
    }

    pub fn deselect(&mut self, id: &BlockId) -> bool {
        self.selected.remove(id)
    }

    /// Clear the selection set (focus is untouched)
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn focus(&mut self, id: BlockId) {
        self.focused = Some(id);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Forget a block entirely. Returns true if anything changed.
    pub fn purge(&mut self, id: &BlockId) -> bool {
        let was_selected = self.selected.remove(id);
        let was_focused = self.focused.as_ref() == Some(id);
        if was_focused {
            self.focused = None;
        }
        was_selected || was_focused
    }

    pub fn reset(&mut self) {
        self.selected.clear();
        self.focused = None;
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &BlockId> {
        self.selected.iter()
    }

    pub fn selected_ids(&self) -> Vec<BlockId> {
        self.selected.iter().cloned().collect()
    }

    pub fn focused(&self) -> Option<&BlockId> {
        self.focused.as_ref()
    }
}
