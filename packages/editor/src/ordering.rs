//! Ordering index: the sequence of block ids that defines document order.

use crate::BlockId;

/// Document order as a duplicate-free sequence of block ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingIndex {
    ids: Vec<BlockId>,
}

impl OrderingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw sequence, bypassing the duplicate guard
    #[cfg(test)]
    pub(crate) fn from_raw(ids: Vec<BlockId>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.ids.iter().position(|existing| existing == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockId> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[BlockId] {
        &self.ids
    }

    /// Insert `id` at `position`, appending when the position is past the end.
    ///
    /// An id already present is moved rather than duplicated. Returns the
    /// index the id ended up at.
    pub fn insert(&mut self, id: BlockId, position: Option<usize>) -> usize {
        self.remove(&id);

        let index = match position {
            Some(position) if position <= self.ids.len() => position,
            _ => self.ids.len(),
        };
        self.ids.insert(index, id);
        index
    }

    /// Remove `id`, returning the index it occupied
    pub fn remove(&mut self, id: &BlockId) -> Option<usize> {
        let index = self.position(id)?;
        self.ids.remove(index);
        Some(index)
    }

    /// Relocate `id` to `to`, clamped to the valid range.
    ///
    /// Returns `(from, to)` with the index actually used, or `None` if the id
    /// is not in the index.
    pub fn relocate(&mut self, id: &BlockId, to: usize) -> Option<(usize, usize)> {
        let from = self.remove(id)?;
        let to = to.min(self.ids.len());
        self.ids.insert(to, id.clone());
        Some((from, to))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
