//! Keyed block store paired with the ordering index.
//!
//! Every write goes through methods that touch both containers together, so
//! an id is in the map if and only if it is in the index.

use std::collections::{HashMap, HashSet};

use crate::{Block, BlockId, OrderingIndex};

#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: HashMap<BlockId, Block>,
    order: OrderingIndex,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn order(&self) -> &OrderingIndex {
        &self.order
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.order.position(id)
    }

    /// Blocks in document order; ids without a record are skipped
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Insert a block at `position` (appending when out of range).
    ///
    /// A block with the same id replaces the existing record and is moved.
    pub fn insert(&mut self, block: Block, position: Option<usize>) -> usize {
        let index = self.order.insert(block.id.clone(), position);
        self.blocks.insert(block.id.clone(), block);
        index
    }

    /// Remove a block, returning the record and the index it occupied
    pub fn remove(&mut self, id: &BlockId) -> Option<(Block, usize)> {
        let block = self.blocks.remove(id)?;
        let index = self.order.remove(id).unwrap_or(self.order.len());
        Some((block, index))
    }

    /// Replace the record of an existing block, keeping its position
    pub fn replace(&mut self, block: Block) -> Option<Block> {
        let slot = self.blocks.get_mut(&block.id)?;
        Some(std::mem::replace(slot, block))
    }

    pub fn relocate(&mut self, id: &BlockId, to: usize) -> Option<(usize, usize)> {
        self.order.relocate(id, to)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.order.clear();
    }

    /// True when the map and the index hold exactly the same ids, each once
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.order.len());
        self.order.len() == self.blocks.len()
            && self
                .order
                .iter()
                .all(|id| self.blocks.contains_key(id) && seen.insert(id))
    }
}
