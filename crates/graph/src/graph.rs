use crate::intern::{SenseId, SenseTable};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Background semantic network. Immutable once built.
///
/// Node indices coincide with [`SenseId`]s, so lookups never go through a map.
/// Neighbor iteration order is fixed at build time and does not depend on
/// hashing.
#[derive(Debug, Clone, Default)]
pub struct SenseGraph {
    graph: UnGraph<SenseId, ()>,
    table: SenseTable,
}

impl SenseGraph {
    /// Neighbors of a sense; empty for senses outside the network
    pub fn neighbors(&self, sense: SenseId) -> impl Iterator<Item = SenseId> + '_ {
        let idx = self.node(sense);
        idx.into_iter()
            .flat_map(move |idx| self.graph.neighbors(idx))
            .map(move |n| self.graph[n])
    }

    pub fn has_relation(&self, a: SenseId, b: SenseId) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(ia), Some(ib)) => self.graph.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    pub fn contains(&self, sense: SenseId) -> bool {
        self.node(sense).is_some()
    }

    pub fn sense_id(&self, key: &str) -> Option<SenseId> {
        self.table.get(key)
    }

    pub fn sense_key(&self, sense: SenseId) -> Option<&str> {
        self.table.resolve(sense)
    }

    pub fn table(&self) -> &SenseTable {
        &self.table
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Hop distance between two senses, exploring at most `limit` hops
    pub fn shortest_distance(&self, from: SenseId, to: SenseId, limit: usize) -> Option<usize> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(0);
        }

        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, 0usize)]);

        while let Some((current, dist)) = queue.pop_front() {
            if dist >= limit {
                continue;
            }
            for next in self.neighbors(current) {
                if next == to {
                    return Some(dist + 1);
                }
                if visited.insert(next) {
                    queue.push_back((next, dist + 1));
                }
            }
        }

        None
    }

    fn node(&self, sense: SenseId) -> Option<NodeIndex> {
        let idx = NodeIndex::new(sense.index());
        self.graph.node_weight(idx).map(|_| idx)
    }
}

/// Collects senses and relations, then freezes them into a [`SenseGraph`]
#[derive(Debug, Default)]
pub struct SenseGraphBuilder {
    table: SenseTable,
    relations: BTreeSet<(SenseId, SenseId)>,
}

impl SenseGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sense(&mut self, key: &str) -> SenseId {
        self.table.intern(key)
    }

    /// Record a relation; self loops and duplicates are dropped
    pub fn add_relation(&mut self, a: &str, b: &str) -> bool {
        let (a, b) = (self.table.intern(a), self.table.intern(b));
        if a == b {
            return false;
        }
        self.relations.insert((a.min(b), a.max(b)))
    }

    pub fn sense_count(&self) -> usize {
        self.table.len()
    }

    pub fn build(self) -> SenseGraph {
        let mut graph = UnGraph::with_capacity(self.table.len(), self.relations.len());
        for id in self.table.ids() {
            graph.add_node(id);
        }
        for &(a, b) in &self.relations {
            graph.add_edge(NodeIndex::new(a.index()), NodeIndex::new(b.index()), ());
        }

        log::debug!(
            "Built sense graph: {} senses, {} relations",
            graph.node_count(),
            graph.edge_count()
        );

        SenseGraph {
            graph,
            table: self.table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SenseGraph {
        let mut builder = SenseGraphBuilder::new();
        builder.add_relation("A", "B");
        builder.add_relation("B", "C");
        builder.add_relation("C", "D");
        builder.build()
    }

    #[test]
    fn test_relations_are_deduplicated() {
        let mut builder = SenseGraphBuilder::new();
        assert!(builder.add_relation("A", "B"));
        assert!(!builder.add_relation("B", "A"));
        assert!(!builder.add_relation("A", "A"));
        let graph = builder.build();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_neighbors_and_relations() {
        let graph = chain();
        let b = graph.sense_id("B").unwrap();
        let mut neighbors: Vec<_> = graph
            .neighbors(b)
            .map(|n| graph.sense_key(n).unwrap())
            .collect();
        neighbors.sort();

        assert_eq!(neighbors, vec!["A", "C"]);
        assert!(graph.has_relation(graph.sense_id("C").unwrap(), b));
        assert!(!graph.has_relation(graph.sense_id("A").unwrap(), graph.sense_id("D").unwrap()));
    }

    #[test]
    fn test_isolated_sense_has_no_neighbors() {
        let mut builder = SenseGraphBuilder::new();
        let lonely = builder.add_sense("lonely");
        let graph = builder.build();

        assert!(graph.contains(lonely));
        assert_eq!(graph.neighbors(lonely).count(), 0);
    }

    #[test]
    fn test_shortest_distance_respects_limit() {
        let graph = chain();
        let a = graph.sense_id("A").unwrap();
        let d = graph.sense_id("D").unwrap();

        assert_eq!(graph.shortest_distance(a, d, 5), Some(3));
        assert_eq!(graph.shortest_distance(a, d, 2), None);
        assert_eq!(graph.shortest_distance(a, a, 0), Some(0));
    }
}
