//! Slab-style arena allocator backing the tree's node storage.
//!
//! Nodes are addressed through integer `NodeId` handles rather than direct
//! references, so sibling relinking on split and merge never leaves a
//! dangling pointer: a discarded node's slot is simply returned to the free
//! list and its id stops resolving.

use std::convert::TryFrom;

/// Node ID type for arena-based allocation.
pub type NodeId = u32;

/// Sentinel id used to terminate the leaf chain.
pub const NULL_NODE: NodeId = u32::MAX;

/// Occupancy statistics for an arena.
#[derive(Debug, Clone, Copy)]
pub struct ArenaStats {
    pub allocated_count: usize,
    pub free_count: usize,
}

/// Arena allocator with slot reuse via a free list.
#[derive(Debug)]
pub struct NodeArena<T> {
    storage: Vec<T>,
    /// Free slot indices available for reuse.
    free_list: Vec<usize>,
    /// Tracks which slots hold a live node.
    allocated: Vec<bool>,
}

impl<T> NodeArena<T> {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            allocated: Vec::new(),
        }
    }

    /// Allocate a new item and return its id.
    #[inline]
    pub fn allocate(&mut self, item: T) -> NodeId {
        let index = if let Some(free_index) = self.free_list.pop() {
            self.storage[free_index] = item;
            self.allocated[free_index] = true;
            free_index
        } else {
            let index = self.storage.len();
            self.storage.push(item);
            self.allocated.push(true);
            index
        };

        NodeId::try_from(index).expect("arena index exceeds NodeId range")
    }

    /// Deallocate an item, returning it if the id was live.
    #[inline]
    pub fn deallocate(&mut self, id: NodeId) -> Option<T>
    where
        T: Default,
    {
        if id == NULL_NODE {
            return None;
        }

        let index = usize::try_from(id).ok()?;
        if !self.allocated.get(index).copied().unwrap_or(false) {
            return None;
        }

        self.allocated[index] = false;
        self.free_list.push(index);
        Some(std::mem::take(&mut self.storage[index]))
    }

    /// Get a reference to a live item.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        if id == NULL_NODE {
            return None;
        }

        let index = usize::try_from(id).ok()?;
        if index < self.storage.len() && self.allocated.get(index).copied().unwrap_or(false) {
            Some(&self.storage[index])
        } else {
            None
        }
    }

    /// Get a mutable reference to a live item.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        if id == NULL_NODE {
            return None;
        }

        let index = usize::try_from(id).ok()?;
        if index < self.storage.len() && self.allocated.get(index).copied().unwrap_or(false) {
            Some(&mut self.storage[index])
        } else {
            None
        }
    }

    /// Check if an id resolves to a live item.
    pub fn contains(&self, id: NodeId) -> bool {
        if id == NULL_NODE {
            return false;
        }

        let index = usize::try_from(id).unwrap_or(usize::MAX);
        index < self.storage.len() && self.allocated.get(index).copied().unwrap_or(false)
    }

    /// Number of live items.
    pub fn allocated_count(&self) -> usize {
        self.allocated.iter().filter(|&&live| live).count()
    }

    /// Number of reusable free slots.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Occupancy statistics.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            allocated_count: self.allocated_count(),
            free_count: self.free_count(),
        }
    }

    /// Drop all items and reset the arena.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.allocated.clear();
        self.free_list.clear();
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_get() {
        let mut arena = NodeArena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);

        assert_eq!(arena.get(id1), Some(&42));
        assert_eq!(arena.get(id2), Some(&84));
        assert!(arena.contains(id1));
        assert!(!arena.contains(NULL_NODE));
        assert_eq!(arena.allocated_count(), 2);
    }

    #[test]
    fn test_deallocate_and_slot_reuse() {
        let mut arena: NodeArena<i32> = NodeArena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);

        assert_eq!(arena.deallocate(id1), Some(42));
        assert!(!arena.contains(id1));
        assert!(arena.contains(id2));
        assert_eq!(arena.free_count(), 1);

        // The freed slot is reused by the next allocation.
        let id3 = arena.allocate(168);
        assert_eq!(id3, id1);
        assert_eq!(arena.get(id3), Some(&168));
        assert_eq!(arena.free_count(), 0);
    }

    #[test]
    fn test_double_deallocate_is_none() {
        let mut arena: NodeArena<i32> = NodeArena::new();
        let id = arena.allocate(7);

        assert_eq!(arena.deallocate(id), Some(7));
        assert_eq!(arena.deallocate(id), None);
        assert_eq!(arena.get(id), None);
    }

    #[test]
    fn test_clear() {
        let mut arena = NodeArena::new();
        arena.allocate(1);
        arena.allocate(2);

        arena.clear();
        assert_eq!(arena.allocated_count(), 0);
        assert_eq!(arena.free_count(), 0);
    }
}
