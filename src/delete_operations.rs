//! Deletion with borrow/merge rebalancing.
//!
//! Removal recurses to the target leaf and unwinds. A node that falls below
//! minimum occupancy reports it to its parent, which repairs the underflow
//! by preference: borrow from the left sibling, borrow from the right
//! sibling, merge into the left sibling, merge the right sibling in. Merges
//! can cascade the underflow upward; an internal root left with no separator
//! keys collapses so its sole child becomes the new root.

use crate::arena::NodeId;
use crate::error::{IndexError, IndexResult, KeyResult, TreeResult};
use crate::types::{NodeRef, OrderedIndex};

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> {
    /// Remove a key, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new(4).unwrap();
    /// index.insert(1, "one").unwrap();
    /// assert_eq!(index.remove(&1).unwrap(), Some("one"));
    /// assert_eq!(index.remove(&1).unwrap(), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> IndexResult<Option<V>> {
        let root = self.root;
        let (removed, _) = self.remove_recursive(&root, key)?;
        self.collapse_root()?;
        Ok(removed)
    }

    /// Remove a key, erroring with [`IndexError::KeyNotFound`] if absent.
    pub fn remove_item(&mut self, key: &K) -> KeyResult<V> {
        self.remove(key)?.ok_or(IndexError::KeyNotFound)
    }

    /// Returns the removed value (if any) and whether this node ended up
    /// below minimum occupancy, leaving the repair to the caller.
    fn remove_recursive(
        &mut self,
        node: &NodeRef<K, V>,
        key: &K,
    ) -> TreeResult<(Option<V>, bool)> {
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self
                    .get_leaf_mut(*id)
                    .ok_or_else(|| IndexError::arena_error("leaf remove", "node not found"))?;
                Ok(leaf.remove(key))
            }
            NodeRef::Internal(id, _) => {
                let (child_index, child) = {
                    let internal = self.get_internal(*id).ok_or_else(|| {
                        IndexError::arena_error("internal descent", "node not found")
                    })?;
                    let child_index = internal.find_child_index(key);
                    let child = internal.children.get(child_index).copied().ok_or_else(|| {
                        IndexError::corrupted_tree("internal node", "child index out of range")
                    })?;
                    (child_index, child)
                };

                let (removed, child_underfull) = self.remove_recursive(&child, key)?;
                if child_underfull {
                    self.repair_underflow(*id, child_index)?;
                }

                let underfull = self
                    .get_internal(*id)
                    .ok_or_else(|| IndexError::arena_error("internal remove", "node not found"))?
                    .is_underfull();
                Ok((removed, underfull))
            }
        }
    }

    /// Shrink the tree by a level when the root is an internal node with no
    /// separator keys left (its sole child takes over as root).
    fn collapse_root(&mut self) -> TreeResult<()> {
        while let NodeRef::Internal(root_id, _) = self.root {
            let sole_child = {
                let root = self
                    .get_internal(root_id)
                    .ok_or_else(|| IndexError::arena_error("root collapse", "node not found"))?;
                if !root.is_empty() {
                    return Ok(());
                }
                root.children.first().copied().ok_or_else(|| {
                    IndexError::corrupted_tree("root", "empty internal root has no children")
                })?
            };
            self.internal_arena.deallocate(root_id);
            self.root = sole_child;
        }
        Ok(())
    }

    /// Repair the underfull child at `child_index` of `parent_id`, trying
    /// in order: borrow from left, borrow from right, merge into left,
    /// merge right in.
    fn repair_underflow(&mut self, parent_id: NodeId, child_index: usize) -> TreeResult<()> {
        let (child, left, right) = {
            let parent = self
                .get_internal(parent_id)
                .ok_or_else(|| IndexError::arena_error("underflow repair", "node not found"))?;
            let child = parent.children.get(child_index).copied().ok_or_else(|| {
                IndexError::corrupted_tree("internal node", "child index out of range")
            })?;
            let left = if child_index > 0 {
                parent.children.get(child_index - 1).copied()
            } else {
                None
            };
            let right = parent.children.get(child_index + 1).copied();
            (child, left, right)
        };

        match child {
            NodeRef::Leaf(child_id, _) => {
                self.repair_leaf_underflow(parent_id, child_index, child_id, left, right)
            }
            NodeRef::Internal(child_id, _) => {
                self.repair_internal_underflow(parent_id, child_index, child_id, left, right)
            }
        }
    }

    fn repair_leaf_underflow(
        &mut self,
        parent_id: NodeId,
        child_index: usize,
        child_id: NodeId,
        left: Option<NodeRef<K, V>>,
        right: Option<NodeRef<K, V>>,
    ) -> TreeResult<()> {
        // Borrow the largest pair from the left sibling; the child's new
        // first key becomes the separator between them.
        if let Some(NodeRef::Leaf(left_id, _)) = left {
            let donated = self
                .get_leaf_mut(left_id)
                .ok_or_else(|| IndexError::arena_error("leaf borrow", "node not found"))?
                .donate_last();
            if let Some((key, value)) = donated {
                let new_separator = {
                    let child = self
                        .get_leaf_mut(child_id)
                        .ok_or_else(|| IndexError::arena_error("leaf borrow", "node not found"))?;
                    child.accept_from_left(key, value);
                    child.keys[0].clone()
                };
                self.get_internal_mut(parent_id)
                    .ok_or_else(|| IndexError::arena_error("leaf borrow", "node not found"))?
                    .keys[child_index - 1] = new_separator;
                return Ok(());
            }
        }

        // Borrow the smallest pair from the right sibling; the sibling's new
        // first key becomes the separator between them.
        if let Some(NodeRef::Leaf(right_id, _)) = right {
            let donated = {
                let sibling = self
                    .get_leaf_mut(right_id)
                    .ok_or_else(|| IndexError::arena_error("leaf borrow", "node not found"))?;
                sibling
                    .donate_first()
                    .map(|pair| (pair, sibling.keys[0].clone()))
            };
            if let Some(((key, value), new_separator)) = donated {
                self.get_leaf_mut(child_id)
                    .ok_or_else(|| IndexError::arena_error("leaf borrow", "node not found"))?
                    .accept_from_right(key, value);
                self.get_internal_mut(parent_id)
                    .ok_or_else(|| IndexError::arena_error("leaf borrow", "node not found"))?
                    .keys[child_index] = new_separator;
                return Ok(());
            }
        }

        // Neither sibling can spare a pair: merge. The absorbed leaf is
        // deallocated and the chain link carried over.
        if let Some(NodeRef::Leaf(left_id, _)) = left {
            let mut absorbed = self
                .leaf_arena
                .deallocate(child_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?;
            let carried_next = self
                .get_leaf_mut(left_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?
                .merge_from(&mut absorbed);
            self.get_leaf_mut(left_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?
                .next = carried_next;
            self.get_internal_mut(parent_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?
                .remove_merged_child(child_index - 1, child_index);
            return Ok(());
        }

        if let Some(NodeRef::Leaf(right_id, _)) = right {
            let mut absorbed = self
                .leaf_arena
                .deallocate(right_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?;
            let carried_next = self
                .get_leaf_mut(child_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?
                .merge_from(&mut absorbed);
            self.get_leaf_mut(child_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?
                .next = carried_next;
            self.get_internal_mut(parent_id)
                .ok_or_else(|| IndexError::arena_error("leaf merge", "node not found"))?
                .remove_merged_child(child_index, child_index + 1);
            return Ok(());
        }

        Err(IndexError::corrupted_tree(
            "leaf rebalance",
            "underfull leaf has no siblings",
        ))
    }

    fn repair_internal_underflow(
        &mut self,
        parent_id: NodeId,
        child_index: usize,
        child_id: NodeId,
        left: Option<NodeRef<K, V>>,
        right: Option<NodeRef<K, V>>,
    ) -> TreeResult<()> {
        // Internal borrows rotate through the parent: the separator moves
        // down into the borrower and the donated key replaces it.
        if let Some(NodeRef::Internal(left_id, _)) = left {
            let donated = self
                .get_internal_mut(left_id)
                .ok_or_else(|| IndexError::arena_error("internal borrow", "node not found"))?
                .donate_last();
            if let Some((donated_key, moved_child)) = donated {
                let old_separator = {
                    let parent = self.get_internal_mut(parent_id).ok_or_else(|| {
                        IndexError::arena_error("internal borrow", "node not found")
                    })?;
                    std::mem::replace(&mut parent.keys[child_index - 1], donated_key)
                };
                self.get_internal_mut(child_id)
                    .ok_or_else(|| IndexError::arena_error("internal borrow", "node not found"))?
                    .accept_from_left(old_separator, moved_child);
                return Ok(());
            }
        }

        if let Some(NodeRef::Internal(right_id, _)) = right {
            let donated = self
                .get_internal_mut(right_id)
                .ok_or_else(|| IndexError::arena_error("internal borrow", "node not found"))?
                .donate_first();
            if let Some((donated_key, moved_child)) = donated {
                let old_separator = {
                    let parent = self.get_internal_mut(parent_id).ok_or_else(|| {
                        IndexError::arena_error("internal borrow", "node not found")
                    })?;
                    std::mem::replace(&mut parent.keys[child_index], donated_key)
                };
                self.get_internal_mut(child_id)
                    .ok_or_else(|| IndexError::arena_error("internal borrow", "node not found"))?
                    .accept_from_right(old_separator, moved_child);
                return Ok(());
            }
        }

        // Merge pulls the separating key down from the parent.
        if let Some(NodeRef::Internal(left_id, _)) = left {
            let separator = self
                .get_internal(parent_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?
                .keys
                .get(child_index - 1)
                .cloned()
                .ok_or_else(|| {
                    IndexError::corrupted_tree("internal node", "separator index out of range")
                })?;
            let mut absorbed = self
                .internal_arena
                .deallocate(child_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?;
            self.get_internal_mut(left_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?
                .merge_from(separator, &mut absorbed);
            self.get_internal_mut(parent_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?
                .remove_merged_child(child_index - 1, child_index);
            return Ok(());
        }

        if let Some(NodeRef::Internal(right_id, _)) = right {
            let separator = self
                .get_internal(parent_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?
                .keys
                .get(child_index)
                .cloned()
                .ok_or_else(|| {
                    IndexError::corrupted_tree("internal node", "separator index out of range")
                })?;
            let mut absorbed = self
                .internal_arena
                .deallocate(right_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?;
            self.get_internal_mut(child_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?
                .merge_from(separator, &mut absorbed);
            self.get_internal_mut(parent_id)
                .ok_or_else(|| IndexError::arena_error("internal merge", "node not found"))?
                .remove_merged_child(child_index, child_index + 1);
            return Ok(());
        }

        Err(IndexError::corrupted_tree(
            "internal rebalance",
            "underfull node has no siblings",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated(order: usize, keys: &[i32]) -> OrderedIndex<i32, i32> {
        let mut index = OrderedIndex::new(order).unwrap();
        for &k in keys {
            index.insert(k, k * 10).unwrap();
        }
        index
    }

    #[test]
    fn test_remove_from_single_leaf() {
        let mut index = populated(4, &[1, 2, 3]);
        assert_eq!(index.remove(&2).unwrap(), Some(20));
        assert_eq!(index.remove(&2).unwrap(), None);
        assert_eq!(index.get(&1), Some(&10));
        assert_eq!(index.get(&3), Some(&30));
    }

    #[test]
    fn test_remove_missing_key_leaves_tree_unchanged() {
        let mut index = populated(4, &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        let before: Vec<(i32, i32)> = index.items().map(|(k, v)| (*k, *v)).collect();

        assert_eq!(index.remove(&55).unwrap(), None);

        let after: Vec<(i32, i32)> = index.items().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
        index.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_remove_item_reports_missing_key() {
        let mut index = populated(4, &[1, 2, 3]);
        assert_eq!(index.remove_item(&2), Ok(20));
        assert_eq!(index.remove_item(&2), Err(IndexError::KeyNotFound));
    }

    #[test]
    fn test_remove_triggers_leaf_rebalancing() {
        // Ten keys at order 4 build a two-level tree where removing a key
        // from a minimally filled leaf forces a borrow or merge.
        let mut index = populated(4, &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);

        assert_eq!(index.remove(&50).unwrap(), Some(500));
        index.check_invariants_detailed().unwrap();

        let keys: Vec<i32> = index.items().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![10, 20, 30, 40, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn test_remove_all_keys_collapses_to_empty_root_leaf() {
        let mut index = populated(4, &(0..64).collect::<Vec<i32>>());
        for k in 0..64 {
            assert_eq!(index.remove(&k).unwrap(), Some(k * 10));
            index.check_invariants_detailed().unwrap();
        }
        assert!(index.is_empty());
        assert!(index.root.is_leaf());
        assert_eq!(index.leaf_count(), 1);
    }

    #[test]
    fn test_remove_in_reverse_order() {
        let mut index = populated(4, &(0..100).collect::<Vec<i32>>());
        for k in (0..100).rev() {
            assert_eq!(index.remove(&k).unwrap(), Some(k * 10));
            index.check_invariants_detailed().unwrap();
        }
        assert!(index.is_empty());
    }

    #[test]
    fn test_merge_reclaims_arena_slots() {
        let mut index = populated(4, &(0..32).collect::<Vec<i32>>());
        let allocated_before = index.allocated_leaf_count();
        for k in 0..31 {
            index.remove(&k).unwrap();
        }
        assert!(index.allocated_leaf_count() < allocated_before);
        assert_eq!(index.allocated_leaf_count(), 1);
    }

    #[test]
    fn test_interleaved_insert_remove() {
        let mut index = OrderedIndex::new(5).unwrap();
        for i in 0..200 {
            index.insert(i, i).unwrap();
            if i % 3 == 0 {
                index.remove(&(i / 2)).unwrap();
            }
            index.check_invariants_detailed().unwrap();
        }
        // Removed keys are floor(3k/2) for k in 0..=66: 0, 1, 3, 4, 6, ...
        assert_eq!(index.get(&0), None);
        assert_eq!(index.get(&1), None);
        assert_eq!(index.get(&2), Some(&2));
        assert_eq!(index.get(&199), Some(&199));
    }
}
