//! Core types and data structures for the ordered index.

use crate::arena::{NodeArena, NodeId};
use std::marker::PhantomData;

/// Minimum order for any node. Below this an underfull node can end up with
/// no sibling to borrow from or merge with, which the rebalancing logic
/// rejects as corruption.
pub(crate) const MIN_ORDER: usize = 3;

/// In-memory ordered index backed by a B+ tree.
///
/// All entries live in leaf nodes; internal nodes hold separator keys only.
/// Leaves are chained in key order, so range scans walk the chain instead of
/// re-descending the tree per key. Nodes are stored in two arenas (one per
/// node kind) and referenced by integer handles.
///
/// # Type Parameters
///
/// * `K` - Key type, totally ordered (`Ord + Clone`)
/// * `V` - Value type (`Clone`)
///
/// # Examples
///
/// ```
/// use ordered_index::OrderedIndex;
///
/// let mut index = OrderedIndex::new(4).unwrap();
/// index.insert(1, "one").unwrap();
/// index.insert(2, "two").unwrap();
///
/// assert_eq!(index.get(&2), Some(&"two"));
/// let pairs: Vec<_> = index.range(1..=2).map(|(k, _)| *k).collect();
/// assert_eq!(pairs, vec![1, 2]);
/// ```
///
/// The index is single-threaded; callers that need sharing should wrap it in
/// a readers-writer lock held across each whole `insert`/`remove` call, since
/// intermediate rebalancing states are not observable mid-operation.
#[derive(Debug)]
pub struct OrderedIndex<K, V> {
    /// Maximum number of keys per node, fixed at construction.
    pub(crate) order: usize,
    /// The root node of the tree.
    pub(crate) root: NodeRef<K, V>,
    /// Arena storage for leaf nodes.
    pub(crate) leaf_arena: NodeArena<LeafNode<K, V>>,
    /// Arena storage for internal nodes.
    pub(crate) internal_arena: NodeArena<InternalNode<K, V>>,
}

/// Leaf node containing key-value pairs.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    /// Maximum number of keys this node can hold.
    pub(crate) order: usize,
    /// Sorted list of keys.
    pub(crate) keys: Vec<K>,
    /// Values corresponding to keys, index for index.
    pub(crate) values: Vec<V>,
    /// Next leaf in key order, or `NULL_NODE` at the end of the chain.
    pub(crate) next: NodeId,
}

/// Internal node containing separator keys and child handles.
#[derive(Debug, Clone)]
pub struct InternalNode<K, V> {
    /// Maximum number of keys this node can hold.
    pub(crate) order: usize,
    /// Sorted list of separator keys.
    pub(crate) keys: Vec<K>,
    /// Child nodes; always exactly one more child than keys.
    pub(crate) children: Vec<NodeRef<K, V>>,
}

/// Tagged node handle. The leaf/internal distinction is carried explicitly
/// in the tag, never inferred from node contents, so a transiently empty
/// node cannot be misclassified.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Internal(NodeId, PhantomData<(K, V)>),
}

impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> NodeRef<K, V> {
    /// Return the raw node id.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Internal(id, _) => id,
        }
    }

    /// Returns true if this handle points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }

    pub(crate) fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub(crate) fn internal(id: NodeId) -> Self {
        NodeRef::Internal(id, PhantomData)
    }
}

/// Outcome of an insertion one level down, consumed by the parent during
/// recursion unwind. A split hands the promoted separator and the freshly
/// allocated right sibling upward; the parent decides where they land.
pub(crate) enum InsertOutcome<K, V> {
    /// Insertion completed without splitting. Carries the old value if the
    /// key was overwritten.
    Updated(Option<V>),
    /// The child split; the parent must insert the separator and new node.
    Split {
        separator: K,
        new_node: NodeRef<K, V>,
    },
}
