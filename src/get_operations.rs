//! Point lookup operations and arena access helpers.

use crate::arena::NodeId;
use crate::error::{IndexError, KeyResult};
use crate::types::{InternalNode, LeafNode, NodeRef, OrderedIndex};

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> {
    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new(4).unwrap();
    /// index.insert(1, "one").unwrap();
    /// assert_eq!(index.get(&1), Some(&"one"));
    /// assert_eq!(index.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_recursive(&self.root, key)
    }

    /// Check if a key exists in the index.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get a value by key, erroring with `KeyNotFound` if absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::{IndexError, OrderedIndex};
    ///
    /// let mut index = OrderedIndex::new(4).unwrap();
    /// index.insert(1, "one").unwrap();
    /// assert_eq!(index.get_item(&1).unwrap(), &"one");
    /// assert_eq!(index.get_item(&2), Err(IndexError::KeyNotFound));
    /// ```
    pub fn get_item(&self, key: &K) -> KeyResult<&V> {
        self.get(key).ok_or(IndexError::KeyNotFound)
    }

    /// Get a mutable reference to the value for a key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let root = self.root;
        self.get_mut_recursive(&root, key)
    }

    /// Recursively search for a key, descending by separator routing.
    fn get_recursive<'a>(&'a self, node: &NodeRef<K, V>, key: &K) -> Option<&'a V> {
        match node {
            NodeRef::Leaf(id, _) => self.get_leaf(*id).and_then(|leaf| leaf.get(key)),
            NodeRef::Internal(id, _) => self
                .get_internal(*id)
                .and_then(|internal| internal.child_for_key(key))
                .and_then(|child| self.get_recursive(&child, key)),
        }
    }

    fn get_mut_recursive(&mut self, node: &NodeRef<K, V>, key: &K) -> Option<&mut V> {
        match node {
            NodeRef::Leaf(id, _) => self.get_leaf_mut(*id).and_then(|leaf| leaf.get_mut(key)),
            NodeRef::Internal(id, _) => {
                let child = self.get_internal(*id)?.child_for_key(key)?;
                self.get_mut_recursive(&child, key)
            }
        }
    }

    // ========================================================================
    // ARENA ACCESS
    // ========================================================================

    /// Get a reference to a leaf node in the arena.
    pub(crate) fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.leaf_arena.get(id)
    }

    /// Get a mutable reference to a leaf node in the arena.
    pub(crate) fn get_leaf_mut(&mut self, id: NodeId) -> Option<&mut LeafNode<K, V>> {
        self.leaf_arena.get_mut(id)
    }

    /// Get a reference to an internal node in the arena.
    pub(crate) fn get_internal(&self, id: NodeId) -> Option<&InternalNode<K, V>> {
        self.internal_arena.get(id)
    }

    /// Get a mutable reference to an internal node in the arena.
    pub(crate) fn get_internal_mut(&mut self, id: NodeId) -> Option<&mut InternalNode<K, V>> {
        self.internal_arena.get_mut(id)
    }

    /// Id of the leftmost leaf, the head of the leaf chain.
    pub(crate) fn first_leaf_id(&self) -> Option<NodeId> {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Internal(id, _) => {
                    current = *self.get_internal(id)?.children.first()?;
                }
            }
        }
    }
}
