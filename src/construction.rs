//! Construction and initialization for the index and its nodes.

use crate::arena::{NodeArena, NULL_NODE};
use crate::error::{IndexError, InitResult};
use crate::types::{InternalNode, LeafNode, NodeRef, OrderedIndex, MIN_ORDER};

/// Default order used by `Default` impls.
pub const DEFAULT_ORDER: usize = 16;

impl<K, V> OrderedIndex<K, V> {
    /// Create an index with the given node order (maximum keys per node).
    ///
    /// Orders below 3 are rejected: with fewer than three keys per node, an
    /// underfull node near the root can have no sibling to borrow from or
    /// merge with, so `min_keys` cannot be honored.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let index = OrderedIndex::<i32, String>::new(4).unwrap();
    /// assert!(index.is_empty());
    /// assert!(OrderedIndex::<i32, String>::new(2).is_err());
    /// ```
    pub fn new(order: usize) -> InitResult<Self> {
        if order < MIN_ORDER {
            return Err(IndexError::invalid_order(order, MIN_ORDER));
        }

        // The tree always has a root; an empty index is a single empty leaf.
        let mut leaf_arena = NodeArena::new();
        let root_id = leaf_arena.allocate(LeafNode::new(order));

        Ok(Self {
            order,
            root: NodeRef::leaf(root_id),
            leaf_arena,
            internal_arena: NodeArena::new(),
        })
    }

    /// Create an index with `DEFAULT_ORDER`.
    pub fn with_default_order() -> InitResult<Self> {
        Self::new(DEFAULT_ORDER)
    }

    /// The node order this index was constructed with.
    pub fn order(&self) -> usize {
        self.order
    }
}

impl<K, V> LeafNode<K, V> {
    /// Create an empty leaf with the given order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            keys: Vec::with_capacity(order + 1),
            values: Vec::with_capacity(order + 1),
            next: NULL_NODE,
        }
    }
}

impl<K, V> InternalNode<K, V> {
    /// Create an empty internal node with the given order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            keys: Vec::with_capacity(order + 1),
            children: Vec::with_capacity(order + 2),
        }
    }
}

impl<K: Ord + Clone, V: Clone> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self::with_default_order().expect("DEFAULT_ORDER is valid")
    }
}

// Default node impls exist so the arena can vacate slots on deallocation.
impl<K, V> Default for LeafNode<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}

impl<K, V> Default for InternalNode<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_index() {
        let index = OrderedIndex::<i32, String>::new(4).unwrap();
        assert_eq!(index.order(), 4);
        assert!(index.root.is_leaf());
    }

    #[test]
    fn test_order_below_minimum_rejected() {
        for order in 0..MIN_ORDER {
            let result = OrderedIndex::<i32, String>::new(order);
            assert!(result.unwrap_err().is_order_error());
        }
        assert!(OrderedIndex::<i32, String>::new(MIN_ORDER).is_ok());
    }

    #[test]
    fn test_default_index() {
        let index = OrderedIndex::<i32, String>::default();
        assert_eq!(index.order(), DEFAULT_ORDER);
    }

    #[test]
    fn test_new_nodes_are_empty() {
        let leaf = LeafNode::<i32, String>::new(4);
        assert!(leaf.keys.is_empty());
        assert_eq!(leaf.next, NULL_NODE);

        let node = InternalNode::<i32, String>::new(4);
        assert!(node.keys.is_empty());
        assert!(node.children.is_empty());
    }
}
