use std::collections::{BTreeMap, BTreeSet, HashMap};

use cdt_types::VertexId;

/// Union-find over vertex ids for connected-component tracking.
///
/// Path-compressed find, union by rank. Vertices stay registered even after
/// deletion; callers partition only the live vertex set.
#[derive(Debug, Clone, Default)]
pub struct ComponentTracker {
    parent: HashMap<VertexId, VertexId>,
    rank: HashMap<VertexId, u32>,
}

impl ComponentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vertex as its own singleton component. Idempotent.
    pub fn insert(&mut self, vertex: VertexId) {
        self.parent.entry(vertex).or_insert(vertex);
        self.rank.entry(vertex).or_insert(0);
    }

    pub fn find(&mut self, vertex: VertexId) -> VertexId {
        self.insert(vertex);
        let mut root = vertex;
        while self.parent[&root] != root {
            root = self.parent[&root];
        }
        // Path compression.
        let mut walk = vertex;
        while self.parent[&walk] != root {
            let next = self.parent[&walk];
            self.parent.insert(walk, root);
            walk = next;
        }
        root
    }

    /// Merge the components of `a` and `b`. Returns true when two distinct
    /// components were actually joined.
    pub fn union(&mut self, a: VertexId, b: VertexId) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        let rank_a = self.rank[&root_a];
        let rank_b = self.rank[&root_b];
        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else if rank_a > rank_b {
            self.parent.insert(root_b, root_a);
        } else {
            self.parent.insert(root_b, root_a);
            self.rank.insert(root_a, rank_a + 1);
        }
        true
    }

    /// Partition `live` vertices into components. Output order is
    /// deterministic: components sorted by their smallest member.
    pub fn components<I>(&mut self, live: I) -> Vec<BTreeSet<VertexId>>
    where
        I: IntoIterator<Item = VertexId>,
    {
        let mut by_root: BTreeMap<VertexId, BTreeSet<VertexId>> = BTreeMap::new();
        for vertex in live {
            let root = self.find(vertex);
            by_root.entry(root).or_default().insert(vertex);
        }
        let mut components: Vec<BTreeSet<VertexId>> = by_root.into_values().collect();
        components.sort_by_key(|c| c.iter().next().copied());
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: u64) -> VertexId {
        VertexId(raw)
    }

    #[test]
    fn test_singletons_until_union() {
        let mut tracker = ComponentTracker::new();
        for raw in 0..3 {
            tracker.insert(v(raw));
        }
        assert_eq!(tracker.components((0..3).map(v)).len(), 3);
    }

    #[test]
    fn test_union_merges_components() {
        let mut tracker = ComponentTracker::new();
        for raw in 0..4 {
            tracker.insert(v(raw));
        }
        assert!(tracker.union(v(0), v(1)));
        assert!(tracker.union(v(2), v(3)));
        assert_eq!(tracker.components((0..4).map(v)).len(), 2);

        assert!(tracker.union(v(1), v(2)));
        let components = tracker.components((0..4).map(v));
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 4);
    }

    #[test]
    fn test_union_of_joined_vertices_is_noop() {
        let mut tracker = ComponentTracker::new();
        tracker.union(v(0), v(1));
        assert!(!tracker.union(v(1), v(0)));
    }

    #[test]
    fn test_dead_vertices_do_not_appear() {
        let mut tracker = ComponentTracker::new();
        tracker.union(v(0), v(1));
        tracker.union(v(1), v(2));
        // Vertex 1 was deleted by a merge; only the live set is partitioned.
        let components = tracker.components([v(0), v(2)]);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 2);
    }
}
