//! Structural invariant checking, used heavily by the test suite.
//!
//! A well-formed tree has sorted keys at every node, non-root nodes at or
//! above minimum occupancy, separator bounds respected by every subtree, all
//! leaves at the same depth, and a leaf chain that visits exactly the tree's
//! leaves in key order. The arenas must hold exactly the reachable nodes.

use crate::arena::{NodeId, NULL_NODE};
use crate::types::{NodeRef, OrderedIndex};

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> {
    /// Returns true if every structural invariant holds.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check every structural invariant, reporting the first violation.
    pub fn check_invariants_detailed(&self) -> Result<(), String> {
        let mut tree_leaves = Vec::new();
        let mut internal_count = 0usize;
        self.check_node(
            &self.root,
            None,
            None,
            true,
            &mut tree_leaves,
            &mut internal_count,
        )?;

        self.check_leaf_chain(&tree_leaves)?;

        if tree_leaves.len() != self.leaf_arena.allocated_count() {
            return Err(format!(
                "leaf arena holds {} nodes but the tree reaches {}",
                self.leaf_arena.allocated_count(),
                tree_leaves.len()
            ));
        }
        if internal_count != self.internal_arena.allocated_count() {
            return Err(format!(
                "internal arena holds {} nodes but the tree reaches {}",
                self.internal_arena.allocated_count(),
                internal_count
            ));
        }

        Ok(())
    }

    /// Recursively validate a subtree within `(lower, upper)` separator
    /// bounds (keys must satisfy `lower <= key < upper`). Returns the leaf
    /// depth of the subtree so the caller can verify uniformity.
    fn check_node(
        &self,
        node: &NodeRef<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
        is_root: bool,
        tree_leaves: &mut Vec<NodeId>,
        internal_count: &mut usize,
    ) -> Result<usize, String> {
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self
                    .get_leaf(*id)
                    .ok_or_else(|| format!("leaf {} referenced but not in arena", id))?;

                if leaf.keys.len() != leaf.values.len() {
                    return Err(format!(
                        "leaf {} has {} keys but {} values",
                        id,
                        leaf.keys.len(),
                        leaf.values.len()
                    ));
                }
                if leaf.keys.len() > leaf.order {
                    return Err(format!("leaf {} exceeds capacity", id));
                }
                if !is_root && leaf.is_underfull() {
                    return Err(format!("non-root leaf {} is underfull", id));
                }
                if !leaf.keys.windows(2).all(|pair| pair[0] < pair[1]) {
                    return Err(format!("leaf {} keys are not strictly ascending", id));
                }
                if let Some(lower) = lower {
                    if leaf.keys.first().map_or(false, |first| first < lower) {
                        return Err(format!("leaf {} violates its lower separator bound", id));
                    }
                }
                if let Some(upper) = upper {
                    if leaf.keys.last().map_or(false, |last| last >= upper) {
                        return Err(format!("leaf {} violates its upper separator bound", id));
                    }
                }

                tree_leaves.push(*id);
                Ok(0)
            }
            NodeRef::Internal(id, _) => {
                let internal = self
                    .get_internal(*id)
                    .ok_or_else(|| format!("internal node {} referenced but not in arena", id))?;
                *internal_count += 1;

                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(format!(
                        "internal node {} has {} keys but {} children",
                        id,
                        internal.keys.len(),
                        internal.children.len()
                    ));
                }
                if internal.keys.len() > internal.order {
                    return Err(format!("internal node {} exceeds capacity", id));
                }
                if is_root {
                    if internal.keys.is_empty() {
                        return Err(format!("internal root {} has no separator keys", id));
                    }
                } else if internal.is_underfull() {
                    return Err(format!("non-root internal node {} is underfull", id));
                }
                if !internal.keys.windows(2).all(|pair| pair[0] < pair[1]) {
                    return Err(format!(
                        "internal node {} keys are not strictly ascending",
                        id
                    ));
                }
                if let Some(lower) = lower {
                    if internal.keys.first().map_or(false, |first| first < lower) {
                        return Err(format!(
                            "internal node {} violates its lower separator bound",
                            id
                        ));
                    }
                }
                if let Some(upper) = upper {
                    if internal.keys.last().map_or(false, |last| last >= upper) {
                        return Err(format!(
                            "internal node {} violates its upper separator bound",
                            id
                        ));
                    }
                }

                let mut leaf_depth = None;
                for (child_index, child) in internal.children.iter().enumerate() {
                    let child_lower = if child_index == 0 {
                        lower
                    } else {
                        Some(&internal.keys[child_index - 1])
                    };
                    let child_upper = if child_index == internal.keys.len() {
                        upper
                    } else {
                        Some(&internal.keys[child_index])
                    };

                    let depth = self.check_node(
                        child,
                        child_lower,
                        child_upper,
                        false,
                        tree_leaves,
                        internal_count,
                    )?;
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(format!(
                                "internal node {} has children at unequal leaf depths",
                                id
                            ));
                        }
                        Some(_) => {}
                    }
                }

                Ok(leaf_depth.unwrap_or(0) + 1)
            }
        }
    }

    /// The next-pointer chain must visit exactly the tree's leaves, in the
    /// same order the tree structure yields them, and terminate.
    fn check_leaf_chain(&self, tree_leaves: &[NodeId]) -> Result<(), String> {
        let mut chained = Vec::new();
        let mut current = self.first_leaf_id();
        while let Some(id) = current {
            if chained.len() > tree_leaves.len() {
                return Err("leaf chain is longer than the tree (cycle?)".to_string());
            }
            chained.push(id);
            let leaf = self
                .get_leaf(id)
                .ok_or_else(|| format!("leaf chain reaches {} which is not in arena", id))?;
            current = if leaf.next == NULL_NODE {
                None
            } else {
                Some(leaf.next)
            };
        }

        if chained != tree_leaves {
            return Err("leaf chain does not match tree leaf order".to_string());
        }
        Ok(())
    }

    /// Dump the tree level by level to stdout. Debug aid only.
    pub fn print_structure(&self)
    where
        K: std::fmt::Debug,
    {
        let mut level: Vec<NodeRef<K, V>> = vec![self.root];
        let mut depth = 0;
        while !level.is_empty() {
            let mut next_level = Vec::new();
            print!("level {}:", depth);
            for node in &level {
                match node {
                    NodeRef::Leaf(id, _) => match self.get_leaf(*id) {
                        Some(leaf) => print!(" leaf[{}]{:?}", id, leaf.keys),
                        None => print!(" leaf[{}]<missing>", id),
                    },
                    NodeRef::Internal(id, _) => match self.get_internal(*id) {
                        Some(internal) => {
                            print!(" node[{}]{:?}", id, internal.keys);
                            next_level.extend(internal.children.iter().copied());
                        }
                        None => print!(" node[{}]<missing>", id),
                    },
                }
            }
            println!();
            level = next_level;
            depth += 1;
        }
    }

    /// Occupancy of each leaf, in chain order. Handy when eyeballing how
    /// balanced the tree is after a workload.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut current = self.first_leaf_id();
        while let Some(id) = current {
            match self.get_leaf(id) {
                Some(leaf) => {
                    sizes.push(leaf.keys.len());
                    current = if leaf.next == NULL_NODE {
                        None
                    } else {
                        Some(leaf.next)
                    };
                }
                None => break,
            }
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeafNode;

    #[test]
    fn test_fresh_index_is_valid() {
        let index: OrderedIndex<i32, i32> = OrderedIndex::new(4).unwrap();
        index.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_valid_after_growth() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..500 {
            index.insert(k, k).unwrap();
        }
        index.check_invariants_detailed().unwrap();
        assert!(index.check_invariants());
    }

    #[test]
    fn test_detects_broken_leaf_chain() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..20 {
            index.insert(k, k).unwrap();
        }
        index.check_invariants_detailed().unwrap();

        // Sever the chain at the first leaf.
        let first = index.first_leaf_id().unwrap();
        index.get_leaf_mut(first).unwrap().next = crate::arena::NULL_NODE;
        assert!(index.check_invariants_detailed().is_err());
    }

    #[test]
    fn test_detects_unsorted_leaf() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..20 {
            index.insert(k, k).unwrap();
        }
        let first = index.first_leaf_id().unwrap();
        index.get_leaf_mut(first).unwrap().keys.reverse();
        assert!(!index.check_invariants());
    }

    #[test]
    fn test_detects_orphaned_arena_node() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..20 {
            index.insert(k, k).unwrap();
        }
        // Allocate a leaf nothing references.
        index.leaf_arena.allocate(LeafNode::new(4));
        assert!(index.check_invariants_detailed().is_err());
    }

    #[test]
    fn test_print_structure_handles_all_shapes() {
        let empty: OrderedIndex<i32, i32> = OrderedIndex::new(4).unwrap();
        empty.print_structure();

        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..30 {
            index.insert(k, k).unwrap();
        }
        index.print_structure();
    }

    #[test]
    fn test_leaf_sizes_reflect_occupancy() {
        let mut index = OrderedIndex::new(4).unwrap();
        for k in 0..3 {
            index.insert(k, k).unwrap();
        }
        assert_eq!(index.leaf_sizes(), vec![3]);

        for k in 3..20 {
            index.insert(k, k).unwrap();
        }
        let sizes = index.leaf_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 20);
        assert!(sizes.iter().all(|&size| size >= 2 && size <= 4));
    }
}
