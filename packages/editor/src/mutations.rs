//! # Reversible Mutations
//!
//! Each committed document mutation is recorded as a [`HistoryAction`] that
//! carries enough data to replay it in either direction.
//!
//! ## Replay Semantics
//!
//! ### Add
//! - Forward reinserts the captured block at its recorded position
//! - Reverse deletes the block and its index entry
//!
//! ### Remove
//! - Forward deletes the block again
//! - Reverse reinserts the captured record at its original position
//!
//! ### Update
//! - Forward restores the post-image, reverse restores the pre-image
//! - Both are full records, so reversal is exact (timestamps included)
//!
//! ### Move
//! - Always removes the id from wherever it currently is before reinserting,
//!   so repeated undo/redo stays idempotent

use serde::{Deserialize, Serialize};

use crate::{Block, BlockId, BlockStore};

/// Kind tag of a history action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryKind {
    Add,
    Remove,
    Update,
    Move,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Add => "add",
            HistoryKind::Remove => "remove",
            HistoryKind::Update => "update",
            HistoryKind::Move => "move",
        }
    }
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed mutation plus the data needed to invert it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum HistoryAction {
    /// A block was inserted at `position`
    Add { block: Block, position: usize },

    /// A block was deleted from `position`
    Remove { block: Block, position: usize },

    /// A block record changed from `before` to `after`
    #[serde(rename_all = "camelCase")]
    Update {
        block_id: BlockId,
        before: Block,
        after: Block,
    },

    /// A block moved between two indices
    #[serde(rename_all = "camelCase")]
    Move {
        block_id: BlockId,
        from: usize,
        to: usize,
    },
}

impl HistoryAction {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryAction::Add { .. } => HistoryKind::Add,
            HistoryAction::Remove { .. } => HistoryKind::Remove,
            HistoryAction::Update { .. } => HistoryKind::Update,
            HistoryAction::Move { .. } => HistoryKind::Move,
        }
    }

    /// The block this action touched
    pub fn block_id(&self) -> &BlockId {
        match self {
            HistoryAction::Add { block, .. } | HistoryAction::Remove { block, .. } => &block.id,
            HistoryAction::Update { block_id, .. } | HistoryAction::Move { block_id, .. } => {
                block_id
            }
        }
    }

    /// The action that undoes this one
    pub fn to_inverse(&self) -> HistoryAction {
        match self {
            HistoryAction::Add { block, position } => HistoryAction::Remove {
                block: block.clone(),
                position: *position,
            },
            HistoryAction::Remove { block, position } => HistoryAction::Add {
                block: block.clone(),
                position: *position,
            },
            HistoryAction::Update {
                block_id,
                before,
                after,
            } => HistoryAction::Update {
                block_id: block_id.clone(),
                before: after.clone(),
                after: before.clone(),
            },
            HistoryAction::Move { block_id, from, to } => HistoryAction::Move {
                block_id: block_id.clone(),
                from: *to,
                to: *from,
            },
        }
    }

    /// Replay this action forward against the store.
    ///
    /// Returns false when the store was not in a state the action applies to
    /// (the store is left untouched in that case).
    pub fn apply(&self, store: &mut BlockStore) -> bool {
        match self {
            HistoryAction::Add { block, position } => {
                store.insert(block.clone(), Some(*position));
                true
            }

            HistoryAction::Remove { block, .. } => store.remove(&block.id).is_some(),

            HistoryAction::Update { after, .. } => store.replace(after.clone()).is_some(),

            HistoryAction::Move { block_id, to, .. } => store.relocate(block_id, *to).is_some(),
        }
    }

    /// Replay this action in reverse against the store
    pub fn revert(&self, store: &mut BlockStore) -> bool {
        self.to_inverse().apply(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockData, BlockPatch};
    use chrono::Utc;

    fn store_with(ids: &[&str]) -> BlockStore {
        let mut store = BlockStore::new();
        for id in ids {
            let block = BlockData::text(*id).into_block(BlockId::new(*id), Utc::now());
            store.insert(block, None);
        }
        store
    }

    fn order(store: &BlockStore) -> Vec<&str> {
        store.order().iter().map(BlockId::as_str).collect()
    }

    #[test]
    fn test_inverse_is_involution() {
        let store = store_with(&["a"]);
        let block = store.get(&"a".into()).unwrap().clone();

        let actions = vec![
            HistoryAction::Add {
                block: block.clone(),
                position: 0,
            },
            HistoryAction::Move {
                block_id: "a".into(),
                from: 0,
                to: 3,
            },
        ];

        for action in actions {
            assert_eq!(action.to_inverse().to_inverse(), action);
        }
    }

    #[test]
    fn test_remove_revert_restores_position() {
        let mut store = store_with(&["a", "b", "c"]);
        let (block, position) = store.remove(&"b".into()).unwrap();
        let action = HistoryAction::Remove { block, position };

        assert!(action.revert(&mut store));
        assert_eq!(order(&store), vec!["a", "b", "c"]);

        assert!(action.apply(&mut store));
        assert_eq!(order(&store), vec!["a", "c"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_update_revert_restores_pre_image() {
        let mut store = store_with(&["a"]);
        let before = store.get(&"a".into()).unwrap().clone();
        let mut after = before.clone();
        after.apply_patch(&BlockPatch::content("changed"), Utc::now());
        store.replace(after.clone());

        let action = HistoryAction::Update {
            block_id: "a".into(),
            before: before.clone(),
            after: after.clone(),
        };

        assert!(action.revert(&mut store));
        assert_eq!(store.get(&"a".into()), Some(&before));

        assert!(action.apply(&mut store));
        assert_eq!(store.get(&"a".into()), Some(&after));
    }

    #[test]
    fn test_move_replay_is_idempotent() {
        let mut store = store_with(&["a", "b", "c"]);
        store.relocate(&"c".into(), 0);
        let action = HistoryAction::Move {
            block_id: "c".into(),
            from: 2,
            to: 0,
        };

        for _ in 0..3 {
            assert!(action.revert(&mut store));
            assert_eq!(order(&store), vec!["a", "b", "c"]);
            assert!(action.apply(&mut store));
            assert_eq!(order(&store), vec!["c", "a", "b"]);
        }
    }

    #[test]
    fn test_apply_on_missing_block_is_noop() {
        let mut store = store_with(&["a"]);
        let action = HistoryAction::Move {
            block_id: "ghost".into(),
            from: 0,
            to: 1,
        };

        assert!(!action.apply(&mut store));
        assert_eq!(order(&store), vec!["a"]);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(HistoryKind::Add.as_str(), "add");
        assert_eq!(HistoryKind::Move.to_string(), "move");
    }
}
