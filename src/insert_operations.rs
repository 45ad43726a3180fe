//! Insertion with node splitting and root growth.
//!
//! Insertion recurses to the target leaf and unwinds: a node that overflows
//! splits, handing the promoted separator and new right sibling to its
//! parent as an `InsertOutcome::Split`. A split that reaches the top grows
//! the tree by one level.

use crate::error::{IndexError, IndexResult, TreeResult};
use crate::types::{InsertOutcome, InternalNode, NodeRef, OrderedIndex};

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> {
    /// Insert a key-value pair. An existing key is overwritten in place and
    /// its old value returned; the entry count never grows on overwrite.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new(4).unwrap();
    /// assert_eq!(index.insert(1, "one").unwrap(), None);
    /// assert_eq!(index.insert(1, "uno").unwrap(), Some("one"));
    /// assert_eq!(index.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> IndexResult<Option<V>> {
        let root = self.root;
        match self.insert_recursive(&root, key, value)? {
            InsertOutcome::Updated(old_value) => Ok(old_value),
            InsertOutcome::Split {
                separator,
                new_node,
            } => {
                // Root split: synthesize a new root holding the single
                // promoted separator and exactly two children.
                let mut new_root = InternalNode::new(self.order);
                new_root.keys.push(separator);
                new_root.children.push(self.root);
                new_root.children.push(new_node);

                let new_root_id = self.internal_arena.allocate(new_root);
                self.root = NodeRef::internal(new_root_id);
                Ok(None)
            }
        }
    }

    fn insert_recursive(
        &mut self,
        node: &NodeRef<K, V>,
        key: K,
        value: V,
    ) -> TreeResult<InsertOutcome<K, V>> {
        match node {
            NodeRef::Leaf(id, _) => {
                let (right, separator) = {
                    let leaf = self
                        .get_leaf_mut(*id)
                        .ok_or_else(|| IndexError::arena_error("leaf insert", "node not found"))?;

                    let old_value = leaf.insert(key, value);
                    if !leaf.needs_split() {
                        return Ok(InsertOutcome::Updated(old_value));
                    }

                    let right = leaf.split();
                    let separator = right.keys[0].clone();
                    (right, separator)
                };

                // Allocate the right sibling first so the left leaf's next
                // link and the new node come into existence together.
                let right_id = self.leaf_arena.allocate(right);
                self.get_leaf_mut(*id)
                    .ok_or_else(|| IndexError::arena_error("leaf relink", "node not found"))?
                    .next = right_id;

                Ok(InsertOutcome::Split {
                    separator,
                    new_node: NodeRef::leaf(right_id),
                })
            }
            NodeRef::Internal(id, _) => {
                let (child_index, child) = {
                    let internal = self.get_internal(*id).ok_or_else(|| {
                        IndexError::arena_error("internal descent", "node not found")
                    })?;
                    let child_index = internal.find_child_index(&key);
                    let child = internal.children.get(child_index).copied().ok_or_else(|| {
                        IndexError::corrupted_tree("internal node", "child index out of range")
                    })?;
                    (child_index, child)
                };

                match self.insert_recursive(&child, key, value)? {
                    InsertOutcome::Updated(old_value) => Ok(InsertOutcome::Updated(old_value)),
                    InsertOutcome::Split {
                        separator,
                        new_node,
                    } => {
                        let (right, promoted) = {
                            let internal = self.get_internal_mut(*id).ok_or_else(|| {
                                IndexError::arena_error("internal insert", "node not found")
                            })?;
                            internal.insert_child(child_index, separator, new_node);
                            if !internal.needs_split() {
                                return Ok(InsertOutcome::Updated(None));
                            }
                            let (promoted, right) = internal.split();
                            (right, promoted)
                        };

                        let right_id = self.internal_arena.allocate(right);
                        Ok(InsertOutcome::Split {
                            separator: promoted,
                            new_node: NodeRef::internal(right_id),
                        })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = OrderedIndex::new(4).unwrap();
        assert_eq!(index.insert(10, "ten").unwrap(), None);
        assert_eq!(index.insert(20, "twenty").unwrap(), None);
        assert_eq!(index.get(&10), Some(&"ten"));
        assert_eq!(index.get(&20), Some(&"twenty"));
    }

    #[test]
    fn test_root_leaf_split_grows_height() {
        let mut index = OrderedIndex::new(4).unwrap();
        for i in 1..=4 {
            index.insert(i, i).unwrap();
        }
        assert!(index.root.is_leaf());

        index.insert(5, 5).unwrap();
        assert!(!index.root.is_leaf());
        for i in 1..=5 {
            assert_eq!(index.get(&i), Some(&i));
        }
    }

    #[test]
    fn test_cascading_splits_preserve_invariants() {
        let mut index = OrderedIndex::new(4).unwrap();
        for i in 0..200 {
            index.insert(i, i * 2).unwrap();
            index.check_invariants_detailed().unwrap();
        }
        assert_eq!(index.len(), 200);
    }

    #[test]
    fn test_reverse_and_interleaved_insert_order() {
        let mut index = OrderedIndex::new(4).unwrap();
        for i in (0..100).rev() {
            index.insert(i, i).unwrap();
        }
        for i in (100..200).step_by(2) {
            index.insert(i, i).unwrap();
        }
        index.check_invariants_detailed().unwrap();

        let keys: Vec<i32> = index.items().map(|(k, _)| *k).collect();
        let mut expected: Vec<i32> = (0..100).collect();
        expected.extend((100..200).step_by(2));
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_overwrite_never_splits() {
        let mut index = OrderedIndex::new(4).unwrap();
        for i in 0..4 {
            index.insert(i, i).unwrap();
        }
        // Node is at capacity; overwriting must not trigger a split.
        assert_eq!(index.insert(2, 22).unwrap(), Some(2));
        assert!(index.root.is_leaf());
        assert_eq!(index.get(&2), Some(&22));
    }
}
