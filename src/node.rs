//! Node-level operations for leaf and internal nodes.
//!
//! Everything here works on a single node's keys/values/children; tree-wide
//! concerns (arena allocation, separator routing to ancestors, sibling
//! lookup) live in the operation modules.

use crate::arena::{NodeId, NULL_NODE};
use crate::types::{InternalNode, LeafNode, NodeRef};

// ============================================================================
// LEAF NODE
// ============================================================================

impl<K: Ord + Clone, V: Clone> LeafNode<K, V> {
    /// Get a value by key from this leaf.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.keys
            .binary_search(key)
            .ok()
            .map(|index| &self.values[index])
    }

    /// Get a mutable reference to a value by key from this leaf.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.keys
            .binary_search(key)
            .ok()
            .map(|index| &mut self.values[index])
    }

    /// Number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf holds no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert a key-value pair in sorted position, or overwrite an existing
    /// key. Returns the old value on overwrite. The caller checks
    /// `needs_split` afterwards; this node may transiently hold one key
    /// beyond its order.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.keys.binary_search(&key) {
            Ok(index) => Some(std::mem::replace(&mut self.values[index], value)),
            Err(index) => {
                self.keys.insert(index, key);
                self.values.insert(index, value);
                None
            }
        }
    }

    /// Split this leaf at the midpoint, returning the new right node.
    ///
    /// The right node takes the upper half of the entries and inherits this
    /// node's `next` link; this node's `next` is cleared and must be
    /// repointed at the right sibling once the caller has allocated it.
    /// The separator to promote is the right node's first key.
    pub fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.keys.len() / 2;

        let right_keys = self.keys.split_off(mid);
        let right_values = self.values.split_off(mid);

        let new_right = LeafNode {
            order: self.order,
            keys: right_keys,
            values: right_values,
            next: self.next,
        };

        self.next = NULL_NODE;
        new_right
    }

    /// Remove a key-value pair. Returns the removed value if the key
    /// existed, and whether the node is now underfull.
    pub fn remove(&mut self, key: &K) -> (Option<V>, bool) {
        match self.keys.binary_search(key) {
            Ok(index) => {
                let removed_value = self.values.remove(index);
                self.keys.remove(index);
                (Some(removed_value), self.is_underfull())
            }
            Err(_) => (None, false),
        }
    }

    /// Returns true if this leaf is at capacity.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.order
    }

    /// Returns true if this leaf must be split.
    pub fn needs_split(&self) -> bool {
        self.keys.len() > self.order
    }

    /// Returns true if this leaf is below minimum occupancy.
    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this leaf can give up a key without underflowing.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    /// Minimum number of keys a non-root leaf must hold.
    pub fn min_keys(&self) -> usize {
        self.order / 2
    }

    /// Take the last key-value pair (this node acting as a left sibling).
    pub fn donate_last(&mut self) -> Option<(K, V)> {
        if !self.can_donate() {
            return None;
        }
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    /// Take the first key-value pair (this node acting as a right sibling).
    pub fn donate_first(&mut self) -> Option<(K, V)> {
        if !self.can_donate() {
            return None;
        }
        Some((self.keys.remove(0), self.values.remove(0)))
    }

    /// Accept a borrowed pair at the front (from the left sibling).
    pub fn accept_from_left(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    /// Accept a borrowed pair at the back (from the right sibling).
    pub fn accept_from_right(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Absorb all entries from `other`, returning its `next` link so the
    /// caller can carry it over while discarding `other`.
    pub fn merge_from(&mut self, other: &mut LeafNode<K, V>) -> NodeId {
        self.keys.append(&mut other.keys);
        self.values.append(&mut other.values);
        let other_next = other.next;
        other.next = NULL_NODE;
        other_next
    }
}

// ============================================================================
// INTERNAL NODE
// ============================================================================

impl<K: Ord + Clone, V: Clone> InternalNode<K, V> {
    /// Number of separator keys in this node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this node holds no separator keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Find the index of the child that covers `key`. A key equal to a
    /// separator routes to the right child, matching the insert path.
    pub fn find_child_index(&self, key: &K) -> usize {
        match self.keys.binary_search(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Child handle covering `key`, if the child list is consistent.
    pub fn child_for_key(&self, key: &K) -> Option<NodeRef<K, V>> {
        self.children.get(self.find_child_index(key)).copied()
    }

    /// Insert a promoted separator and the new right sibling produced by a
    /// child split. `child_index` is the position of the child that split;
    /// the new sibling lands immediately after it.
    pub fn insert_child(&mut self, child_index: usize, separator: K, new_child: NodeRef<K, V>) {
        self.keys.insert(child_index, separator);
        self.children.insert(child_index + 1, new_child);
    }

    /// Split this node at the midpoint, returning the promoted middle key
    /// and the new right node. The promoted key is removed from both halves;
    /// children are partitioned around it.
    pub fn split(&mut self) -> (K, InternalNode<K, V>) {
        let mid = self.keys.len() / 2;

        let right_keys = self.keys.split_off(mid + 1);
        let right_children = self.children.split_off(mid + 1);
        let promoted = self.keys.pop().expect("split on node with no keys");

        let new_right = InternalNode {
            order: self.order,
            keys: right_keys,
            children: right_children,
        };

        (promoted, new_right)
    }

    /// Returns true if this node is at capacity.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.order
    }

    /// Returns true if this node must be split.
    pub fn needs_split(&self) -> bool {
        self.keys.len() > self.order
    }

    /// Returns true if this node is below minimum occupancy.
    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this node can give up a key without underflowing.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    /// Minimum number of keys a non-root internal node must hold.
    pub fn min_keys(&self) -> usize {
        self.order / 2
    }

    /// Take the last key and child (this node acting as a left sibling).
    /// The donated key moves up to the parent as the new separator, not
    /// directly into the borrower.
    pub fn donate_last(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if !self.can_donate() {
            return None;
        }
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Take the first key and child (this node acting as a right sibling).
    pub fn donate_first(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if !self.can_donate() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Accept the parent separator and a relocated child at the front.
    pub fn accept_from_left(&mut self, separator: K, moved_child: NodeRef<K, V>) {
        self.keys.insert(0, separator);
        self.children.insert(0, moved_child);
    }

    /// Accept the parent separator and a relocated child at the back.
    pub fn accept_from_right(&mut self, separator: K, moved_child: NodeRef<K, V>) {
        self.keys.push(separator);
        self.children.push(moved_child);
    }

    /// Absorb the parent separator plus all keys and children from `other`.
    pub fn merge_from(&mut self, separator: K, other: &mut InternalNode<K, V>) {
        self.keys.push(separator);
        self.keys.append(&mut other.keys);
        self.children.append(&mut other.children);
    }

    /// Drop the separator at `key_index` and the child at `child_index`
    /// after a merge has absorbed that child.
    pub fn remove_merged_child(&mut self, key_index: usize, child_index: usize) {
        self.keys.remove(key_index);
        self.children.remove(child_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeRef;

    fn leaf_with(order: usize, pairs: &[(i32, i32)]) -> LeafNode<i32, i32> {
        let mut leaf = LeafNode::new(order);
        for &(k, v) in pairs {
            leaf.insert(k, v);
        }
        leaf
    }

    #[test]
    fn test_leaf_insert_sorted_and_overwrite() {
        let mut leaf = leaf_with(4, &[(3, 30), (1, 10), (2, 20)]);
        assert_eq!(leaf.keys, vec![1, 2, 3]);
        assert_eq!(leaf.values, vec![10, 20, 30]);

        // Overwrite keeps the count stable and returns the old value.
        assert_eq!(leaf.insert(2, 25), Some(20));
        assert_eq!(leaf.len(), 3);
        assert_eq!(leaf.get(&2), Some(&25));
    }

    #[test]
    fn test_leaf_split_promotes_right_first_key() {
        let mut leaf = leaf_with(4, &[(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);
        assert!(leaf.needs_split());

        let right = leaf.split();
        assert_eq!(leaf.keys, vec![1, 2]);
        assert_eq!(right.keys, vec![3, 4, 5]);
        assert_eq!(right.keys[0], 3);
        assert_eq!(leaf.next, NULL_NODE);
    }

    #[test]
    fn test_leaf_split_carries_next_link() {
        let mut leaf = leaf_with(4, &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        leaf.next = 99;

        let right = leaf.split();
        assert_eq!(right.next, 99);
        assert_eq!(leaf.next, NULL_NODE);
    }

    #[test]
    fn test_leaf_remove_reports_underflow() {
        let mut leaf = leaf_with(4, &[(1, 10), (2, 20)]);
        // min_keys = 2, so dropping to one key underflows.
        let (removed, underfull) = leaf.remove(&1);
        assert_eq!(removed, Some(10));
        assert!(underfull);

        let (removed, underfull) = leaf.remove(&7);
        assert_eq!(removed, None);
        assert!(!underfull);
    }

    #[test]
    fn test_occupancy_predicates() {
        let mut leaf = leaf_with(4, &[(1, 1), (2, 2), (3, 3)]);
        assert!(!leaf.is_full());
        assert!(!leaf.needs_split());

        leaf.insert(4, 4);
        assert!(leaf.is_full());
        assert!(!leaf.needs_split());

        leaf.insert(5, 5);
        assert!(leaf.needs_split());
    }

    #[test]
    fn test_leaf_donate_respects_minimum() {
        let mut leaf = leaf_with(4, &[(1, 10), (2, 20)]);
        assert!(!leaf.can_donate());
        assert_eq!(leaf.donate_last(), None);

        leaf.insert(3, 30);
        assert_eq!(leaf.donate_last(), Some((3, 30)));
        assert_eq!(leaf.donate_first(), None); // back at min_keys
    }

    #[test]
    fn test_leaf_merge_carries_next() {
        let mut left = leaf_with(4, &[(1, 10), (2, 20)]);
        let mut right = leaf_with(4, &[(3, 30), (4, 40)]);
        right.next = 7;

        let carried = left.merge_from(&mut right);
        assert_eq!(carried, 7);
        assert_eq!(left.keys, vec![1, 2, 3, 4]);
        assert!(right.keys.is_empty());
    }

    #[test]
    fn test_internal_child_routing_equal_key_goes_right() {
        let mut node = InternalNode::<i32, i32>::new(4);
        node.keys = vec![5, 10];
        node.children = vec![NodeRef::leaf(0), NodeRef::leaf(1), NodeRef::leaf(2)];

        assert_eq!(node.find_child_index(&3), 0);
        assert_eq!(node.find_child_index(&5), 1);
        assert_eq!(node.find_child_index(&7), 1);
        assert_eq!(node.find_child_index(&10), 2);
        assert_eq!(node.find_child_index(&15), 2);
    }

    #[test]
    fn test_internal_split_removes_promoted_key_from_both_sides() {
        let mut node = InternalNode::<i32, i32>::new(4);
        node.keys = vec![10, 20, 30, 40, 50];
        node.children = (0..6).map(NodeRef::leaf).collect();

        let (promoted, right) = node.split();
        assert_eq!(promoted, 30);
        assert_eq!(node.keys, vec![10, 20]);
        assert_eq!(node.children.len(), 3);
        assert_eq!(right.keys, vec![40, 50]);
        assert_eq!(right.children.len(), 3);
    }

    #[test]
    fn test_internal_merge_absorbs_separator() {
        let mut left = InternalNode::<i32, i32>::new(4);
        left.keys = vec![10];
        left.children = vec![NodeRef::leaf(0), NodeRef::leaf(1)];

        let mut right = InternalNode::<i32, i32>::new(4);
        right.keys = vec![30];
        right.children = vec![NodeRef::leaf(2), NodeRef::leaf(3)];

        left.merge_from(20, &mut right);
        assert_eq!(left.keys, vec![10, 20, 30]);
        assert_eq!(left.children.len(), 4);
    }
}
