//! An in-memory ordered index backed by a B+ tree.
//!
//! Keys and values live only in leaves; internal nodes hold separator keys
//! that route lookups. Leaves are linked into a chain so ordered scans never
//! re-descend the tree. Nodes live in typed arenas and refer to each other
//! by integer handle, so the tree has no parent pointers and no reference
//! cycles; rebalancing decisions flow back up the recursion as explicit
//! return values.
//!
//! The `order` chosen at construction is the maximum number of keys per
//! node; a node that drops below `order / 2` keys borrows from or merges
//! with a sibling. Orders below 3 are rejected because rebalancing needs a
//! sibling that can spare a key.
//!
//! # Examples
//!
//! ```
//! use ordered_index::OrderedIndex;
//!
//! let mut index = OrderedIndex::new(4)?;
//! index.insert("b", 2)?;
//! index.insert("a", 1)?;
//! index.insert("c", 3)?;
//!
//! assert_eq!(index.get(&"b"), Some(&2));
//! assert_eq!(index.remove(&"a")?, Some(1));
//!
//! let keys: Vec<&str> = index.keys().copied().collect();
//! assert_eq!(keys, vec!["b", "c"]);
//! # Ok::<(), ordered_index::IndexError>(())
//! ```

mod arena;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod macros;
mod node;
mod types;
mod validation;

pub use arena::{ArenaStats, NodeId, NULL_NODE};
pub use construction::DEFAULT_ORDER;
pub use error::{IndexError, IndexResult, InitResult, KeyResult};
pub use iteration::{ItemIterator, KeyIterator, RangeIterator, ValueIterator};
pub use types::OrderedIndex;

use types::{LeafNode, NodeRef};

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> {
    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.leaf_sizes().iter().sum()
    }

    /// Returns true if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entry with the smallest key, if any.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.items().next()
    }

    /// The entry with the largest key, if any.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => {
                    let leaf = self.get_leaf(id)?;
                    let last = leaf.keys.len().checked_sub(1)?;
                    return Some((&leaf.keys[last], &leaf.values[last]));
                }
                NodeRef::Internal(id, _) => {
                    current = self.get_internal(id)?.children.last().copied()?;
                }
            }
        }
    }

    /// Drop every entry, resetting to a single empty root leaf. Arena slots
    /// are released but their backing storage is kept for reuse.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.internal_arena.clear();
        let root_id = self.leaf_arena.allocate(LeafNode::new(self.order));
        self.root = NodeRef::leaf(root_id);
    }

    /// Number of leaves in the chain.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut current = self.first_leaf_id();
        while let Some(id) = current {
            count += 1;
            current = self.get_leaf(id).and_then(|leaf| {
                if leaf.next == NULL_NODE {
                    None
                } else {
                    Some(leaf.next)
                }
            });
        }
        count
    }

    /// Number of leaf nodes currently allocated in the arena.
    pub fn allocated_leaf_count(&self) -> usize {
        self.leaf_arena.allocated_count()
    }

    /// Allocation statistics for the leaf arena.
    pub fn leaf_arena_stats(&self) -> ArenaStats {
        self.leaf_arena.stats()
    }

    /// Allocation statistics for the internal-node arena.
    pub fn internal_arena_stats(&self) -> ArenaStats {
        self.internal_arena.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::macros::order_battery!(3, 4, 5, 7, 16, 64);

    #[test]
    fn test_len_and_is_empty() {
        let mut index = OrderedIndex::new(4).unwrap();
        assert!(index.is_empty());
        for k in 0..10usize {
            index.insert(k, k).unwrap();
            assert_eq!(index.len(), k + 1);
        }
        index.remove(&3).unwrap();
        assert_eq!(index.len(), 9);
    }

    #[test]
    fn test_first_and_last() {
        let mut index = OrderedIndex::new(4).unwrap();
        assert_eq!(index.first(), None);
        assert_eq!(index.last(), None);

        for k in [50, 10, 90, 30, 70] {
            index.insert(k, k * 2).unwrap();
        }
        assert_eq!(index.first(), Some((&10, &20)));
        assert_eq!(index.last(), Some((&90, &180)));
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..100 {
            index.insert(k, k).unwrap();
        }
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.leaf_count(), 1);
        assert_eq!(index.get(&50), None);
        index.check_invariants_detailed().unwrap();

        // Reusable after clearing.
        index.insert(7, 7).unwrap();
        assert_eq!(index.get(&7), Some(&7));
    }

    #[test]
    fn test_arena_stats_track_churn() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..100 {
            index.insert(k, k).unwrap();
        }
        let grown = index.leaf_arena_stats();
        assert!(grown.allocated_count > 1);

        for k in 0..100 {
            index.remove(&k).unwrap();
        }
        let drained = index.leaf_arena_stats();
        assert_eq!(drained.allocated_count, 1);
        assert!(drained.free_count > 0);
    }
}
