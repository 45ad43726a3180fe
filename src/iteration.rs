//! Ordered iteration over the leaf chain.
//!
//! All iterators walk the linked list of leaves rather than descending the
//! tree per item. `ItemIterator` caches a reference to the current leaf so
//! advancing within a leaf is a plain index bump; the arena is consulted
//! only when hopping to the next leaf.

use std::ops::Bound;
use std::ops::RangeBounds;

use crate::arena::{NodeId, NULL_NODE};
use crate::types::{LeafNode, NodeRef, OrderedIndex};

/// Iterator over `(key, value)` pairs in ascending key order.
pub struct ItemIterator<'a, K, V> {
    index: &'a OrderedIndex<K, V>,
    current_leaf: Option<&'a LeafNode<K, V>>,
    entry_index: usize,
}

impl<'a, K: Ord + Clone, V: Clone> ItemIterator<'a, K, V> {
    pub(crate) fn new(index: &'a OrderedIndex<K, V>) -> Self {
        let current_leaf = index.first_leaf_id().and_then(|id| index.get_leaf(id));
        Self {
            index,
            current_leaf,
            entry_index: 0,
        }
    }

    /// Start at a specific leaf and entry, for positioned (range) scans.
    pub(crate) fn starting_at(
        index: &'a OrderedIndex<K, V>,
        leaf_id: NodeId,
        entry_index: usize,
    ) -> Self {
        Self {
            index,
            current_leaf: index.get_leaf(leaf_id),
            entry_index,
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for ItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.current_leaf?;
            if self.entry_index < leaf.keys.len() {
                let item = (&leaf.keys[self.entry_index], &leaf.values[self.entry_index]);
                self.entry_index += 1;
                return Some(item);
            }

            // Exhausted this leaf; hop along the chain.
            if leaf.next == NULL_NODE {
                self.current_leaf = None;
                return None;
            }
            self.current_leaf = self.index.get_leaf(leaf.next);
            self.entry_index = 0;
        }
    }
}

/// Iterator over keys in ascending order.
pub struct KeyIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(key, _)| key)
    }
}

/// Iterator over values in ascending key order.
pub struct ValueIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for ValueIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, value)| value)
    }
}

/// Iterator over `(key, value)` pairs restricted to a key range.
pub struct RangeIterator<'a, K, V> {
    items: Option<ItemIterator<'a, K, V>>,
    end: Bound<K>,
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for RangeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.items.as_mut()?.next()?;
        let in_range = match &self.end {
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
            Bound::Unbounded => true,
        };
        if in_range {
            Some((key, value))
        } else {
            self.items = None;
            None
        }
    }
}

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> {
    /// Iterate all entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new(4).unwrap();
    /// for k in [3, 1, 2] {
    ///     index.insert(k, k * 10).unwrap();
    /// }
    /// let keys: Vec<i32> = index.items().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, vec![1, 2, 3]);
    /// ```
    pub fn items(&self) -> ItemIterator<'_, K, V> {
        ItemIterator::new(self)
    }

    /// Iterate keys in ascending order.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator { items: self.items() }
    }

    /// Iterate values in ascending key order.
    pub fn values(&self) -> ValueIterator<'_, K, V> {
        ValueIterator { items: self.items() }
    }

    /// Iterate entries whose keys fall within `range`, in ascending order.
    /// An empty or inverted range yields no items.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new(4).unwrap();
    /// for k in 0..10 {
    ///     index.insert(k, k).unwrap();
    /// }
    /// let keys: Vec<i32> = index.range(3..=6).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, vec![3, 4, 5, 6]);
    /// ```
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> RangeIterator<'_, K, V> {
        let end = range.end_bound().cloned();
        let items = match range.start_bound() {
            Bound::Unbounded => self.first_leaf_id().map(|id| ItemIterator::starting_at(self, id, 0)),
            Bound::Included(start) => self.position_of(start, false),
            Bound::Excluded(start) => self.position_of(start, true),
        };
        RangeIterator { items, end }
    }

    /// Locate the leaf and entry index of the first key `>= start` (or
    /// `> start` when `exclusive`). The returned position may sit one past
    /// the leaf's last entry; the iterator hops the chain from there.
    fn position_of(&self, start: &K, exclusive: bool) -> Option<ItemIterator<'_, K, V>> {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => {
                    let leaf = self.get_leaf(id)?;
                    let entry_index = match leaf.keys.binary_search(start) {
                        Ok(found) if exclusive => found + 1,
                        Ok(found) => found,
                        Err(insertion) => insertion,
                    };
                    return Some(ItemIterator::starting_at(self, id, entry_index));
                }
                NodeRef::Internal(id, _) => {
                    current = self.get_internal(id)?.child_for_key(start)?;
                }
            }
        }
    }
}
