use crate::config::DisambiguationConfig;
use crate::error::{GraphError, Result};
use crate::graph::SenseGraph;
use crate::intern::SenseId;
use crate::observer::{DisambiguationObserver, NoopObserver};
use crate::types::{CandidateSet, DisambiguationGraph, UndirectedEdge};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation flag, checked at every search step
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Limits applied while building one disambiguation graph
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    pub max_edges: Option<usize>,
    pub max_expansions: Option<usize>,
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationToken>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Budget for a session starting now
    pub fn from_config(config: &DisambiguationConfig) -> Self {
        Self {
            max_edges: config.max_edges,
            max_expansions: config.max_expansions,
            deadline: config.timeout().map(|t| Instant::now() + t),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Counters gathered while building a disambiguation graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub seeds: usize,
    pub expansions: usize,
    pub paths_found: usize,
    pub edges_inserted: usize,

    /// The budget ran out before every seed was searched
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: DisambiguationGraph,
    pub stats: BuildStats,
}

/// Builds the per-context disambiguation graph by bounded depth-first
/// search between candidate senses of the sense network.
#[derive(Debug, Clone)]
pub struct DisambiguationGraphBuilder {
    max_depth: usize,
    budget: SearchBudget,
}

impl DisambiguationGraphBuilder {
    pub fn new(max_depth: usize) -> Result<Self> {
        if max_depth == 0 {
            return Err(GraphError::invalid_config("max_depth must be >= 1"));
        }
        Ok(Self {
            max_depth,
            budget: SearchBudget::unlimited(),
        })
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn build(&self, candidates: &CandidateSet, network: &SenseGraph) -> Result<BuildOutcome> {
        self.build_observed(candidates, network, &mut NoopObserver)
    }

    /// Build the graph, reporting every mutation to `observer`.
    ///
    /// An exhausted budget yields the graph as built so far with
    /// `stats.truncated` set; only cancellation is an error.
    pub fn build_observed(
        &self,
        candidates: &CandidateSet,
        network: &SenseGraph,
        observer: &mut dyn DisambiguationObserver,
    ) -> Result<BuildOutcome> {
        let mut graph = DisambiguationGraph::new();

        // Phase 1: seed every candidate sense as an isolated vertex
        for candidate in candidates {
            if candidate.senses.is_empty() {
                log::warn!("No candidate senses for {}, skipping", candidate.sod);
                continue;
            }
            for &sense in &candidate.senses {
                if graph.add_vertex(sense) {
                    observer.vertex_added(sense);
                }
            }
        }

        // Phase 2: search from a snapshot of the seeds, never the live vertex set
        let seeds = candidates.seed_senses();
        let goals: HashSet<SenseId> = seeds.iter().copied().collect();

        let mut run = SearchRun {
            network,
            goals: &goals,
            graph: &mut graph,
            budget: &self.budget,
            stats: BuildStats {
                seeds: seeds.len(),
                ..Default::default()
            },
            observer,
        };

        for &root in &seeds {
            let mut path = SearchPath::rooted(root);
            match run.extend(&mut path, root, self.max_depth) {
                Ok(_) => {}
                Err(Halt::Exhausted(limit)) => {
                    log::warn!(
                        "Search budget exhausted ({limit}); returning partial disambiguation graph"
                    );
                    run.stats.truncated = true;
                    break;
                }
                Err(Halt::Cancelled) => return Err(GraphError::Cancelled),
            }
        }

        let stats = run.stats;
        log::debug!(
            "Disambiguation graph: {} vertices, {} edges ({} paths, {} expansions)",
            graph.vertex_count(),
            graph.edge_count(),
            stats.paths_found,
            stats.expansions
        );

        Ok(BuildOutcome { graph, stats })
    }
}

/// Why a search run stopped early
enum Halt {
    Exhausted(&'static str),
    Cancelled,
}

/// Current DFS stack of one rooted traversal
struct SearchPath {
    vertices: Vec<SenseId>,
    edges: Vec<UndirectedEdge>,
    on_path: HashSet<SenseId>,
}

impl SearchPath {
    fn rooted(root: SenseId) -> Self {
        Self {
            vertices: vec![root],
            edges: Vec::new(),
            on_path: HashSet::from([root]),
        }
    }

    fn contains(&self, sense: SenseId) -> bool {
        self.on_path.contains(&sense)
    }

    fn push(&mut self, from: SenseId, to: SenseId) {
        self.vertices.push(to);
        self.edges.push(UndirectedEdge::new(from, to));
        self.on_path.insert(to);
    }

    fn pop(&mut self) {
        if let Some(sense) = self.vertices.pop() {
            self.on_path.remove(&sense);
        }
        self.edges.pop();
    }
}

struct SearchRun<'a> {
    network: &'a SenseGraph,
    goals: &'a HashSet<SenseId>,
    graph: &'a mut DisambiguationGraph,
    budget: &'a SearchBudget,
    stats: BuildStats,
    observer: &'a mut dyn DisambiguationObserver,
}

impl SearchRun<'_> {
    /// Explore from `current` with `remaining` hops left. Returns whether any
    /// goal was reached below this frame.
    fn extend(
        &mut self,
        path: &mut SearchPath,
        current: SenseId,
        remaining: usize,
    ) -> std::result::Result<bool, Halt> {
        self.charge_step()?;

        let network = self.network;
        let mut reached = false;

        for next in network.neighbors(current) {
            if path.contains(next) || self.graph.contains_edge(current, next) {
                continue;
            }

            if self.goals.contains(&next) {
                path.push(current, next);
                let accepted = self.accept(path);
                path.pop();
                accepted?;
                reached = true;
            } else if remaining > 1 {
                path.push(current, next);
                let found = self.extend(path, next, remaining - 1);
                path.pop();
                reached |= found?;
            }
        }

        Ok(reached)
    }

    /// Persist every edge of a path that ended on a goal
    fn accept(&mut self, path: &SearchPath) -> std::result::Result<(), Halt> {
        if let Some(max_edges) = self.budget.max_edges {
            let fresh = path
                .edges
                .iter()
                .filter(|e| {
                    let (a, b) = e.endpoints();
                    !self.graph.contains_edge(a, b)
                })
                .count();
            if self.graph.edge_count() + fresh > max_edges {
                return Err(Halt::Exhausted("edge cap"));
            }
        }

        for edge in &path.edges {
            let (a, b) = edge.endpoints();
            for sense in [a, b] {
                if !self.graph.contains_vertex(sense) {
                    self.observer.vertex_added(sense);
                }
            }
            if self.graph.add_edge(a, b) {
                self.stats.edges_inserted += 1;
                self.observer.edge_added(a, b);
            }
        }

        self.stats.paths_found += 1;
        self.observer.path_accepted(&path.vertices);
        Ok(())
    }

    fn charge_step(&mut self) -> std::result::Result<(), Halt> {
        self.stats.expansions += 1;

        if let Some(token) = &self.budget.cancel {
            if token.is_cancelled() {
                return Err(Halt::Cancelled);
            }
        }

        if let Some(max) = self.budget.max_expansions {
            if self.stats.expansions > max {
                return Err(Halt::Exhausted("expansion budget"));
            }
        }

        if let Some(deadline) = self.budget.deadline {
            if Instant::now() >= deadline {
                return Err(Halt::Exhausted("deadline"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SenseGraphBuilder;
    use crate::observer::{ObserverEvent, RecordingObserver};
    use crate::types::{Candidate, PartOfSpeech, Sod};
    use pretty_assertions::assert_eq;

    fn network(relations: &[(&str, &str)]) -> SenseGraph {
        let mut builder = SenseGraphBuilder::new();
        for (a, b) in relations {
            builder.add_relation(a, b);
        }
        builder.build()
    }

    fn candidates(network: &SenseGraph, sods: &[(&str, &[&str])]) -> CandidateSet {
        sods.iter()
            .map(|(term, senses)| {
                Candidate::new(
                    Sod::new(*term, PartOfSpeech::Noun),
                    senses.iter().map(|s| network.sense_id(s).unwrap()).collect(),
                )
            })
            .collect()
    }

    fn ids(network: &SenseGraph, keys: &[&str]) -> Vec<SenseId> {
        keys.iter().map(|k| network.sense_id(k).unwrap()).collect()
    }

    fn edge_keys(network: &SenseGraph, graph: &DisambiguationGraph) -> Vec<(String, String)> {
        let mut keys: Vec<_> = graph
            .edges()
            .map(|e| {
                let (a, b) = e.endpoints();
                let (a, b) = (network.sense_key(a).unwrap(), network.sense_key(b).unwrap());
                if a <= b {
                    (a.to_string(), b.to_string())
                } else {
                    (b.to_string(), a.to_string())
                }
            })
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(matches!(
            DisambiguationGraphBuilder::new(0),
            Err(GraphError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_path_through_intermediates_is_persisted() {
        let net = network(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["D"])]);

        let outcome = DisambiguationGraphBuilder::new(3).unwrap().build(&set, &net).unwrap();

        assert_eq!(
            edge_keys(&net, &outcome.graph),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string()),
                ("C".to_string(), "D".to_string()),
            ]
        );
        assert_eq!(outcome.stats.paths_found, 1);
        assert_eq!(outcome.stats.edges_inserted, 3);
        assert!(!outcome.stats.truncated);
    }

    #[test]
    fn test_dead_end_branches_are_not_inserted() {
        // E hangs off B but leads nowhere
        let net = network(&[("A", "B"), ("B", "C"), ("B", "E"), ("E", "F")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["C"])]);

        let outcome = DisambiguationGraphBuilder::new(3).unwrap().build(&set, &net).unwrap();

        assert_eq!(
            edge_keys(&net, &outcome.graph),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string()),
            ]
        );
        assert!(!outcome.graph.contains_vertex(net.sense_id("E").unwrap()));
    }

    #[test]
    fn test_search_stops_at_first_goal_on_branch() {
        // From A the branch ends at seed B; it never continues to D
        let net = network(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["B"]), ("z", &["D"])]);
        let mut observer = RecordingObserver::new();

        DisambiguationGraphBuilder::new(3)
            .unwrap()
            .build_observed(&set, &net, &mut observer)
            .unwrap();

        let paths: Vec<_> = observer.accepted_paths().map(|p| p.to_vec()).collect();
        assert_eq!(paths, vec![ids(&net, &["A", "B"]), ids(&net, &["B", "C", "D"])]);
    }

    #[test]
    fn test_depth_one_only_links_adjacent_seeds() {
        let net = network(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["B"]), ("z", &["D"])]);

        let outcome = DisambiguationGraphBuilder::new(1).unwrap().build(&set, &net).unwrap();

        assert_eq!(
            edge_keys(&net, &outcome.graph),
            vec![("A".to_string(), "B".to_string())]
        );
    }

    #[test]
    fn test_senses_of_same_term_connect_too() {
        // Goals include every other seed, not only seeds of other terms
        let net = network(&[("A1", "A2")]);
        let set = candidates(&net, &[("x", &["A1", "A2"])]);

        let outcome = DisambiguationGraphBuilder::new(1).unwrap().build(&set, &net).unwrap();
        assert_eq!(outcome.graph.edge_count(), 1);
    }

    #[test]
    fn test_observer_sees_accepted_path_in_order() {
        let net = network(&[("A", "B"), ("B", "C")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["C"])]);
        let mut observer = RecordingObserver::new();

        DisambiguationGraphBuilder::new(2)
            .unwrap()
            .build_observed(&set, &net, &mut observer)
            .unwrap();

        let paths: Vec<_> = observer.accepted_paths().map(|p| p.to_vec()).collect();
        assert_eq!(paths, vec![ids(&net, &["A", "B", "C"])]);

        let b = net.sense_id("B").unwrap();
        assert!(observer.events.contains(&ObserverEvent::VertexAdded(b)));
    }

    #[test]
    fn test_edge_cap_truncates_without_partial_paths() {
        let net = network(&[("A", "B"), ("B", "C"), ("A", "X"), ("X", "Y"), ("Y", "D")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["C", "D"])]);
        let budget = SearchBudget {
            max_edges: Some(2),
            ..Default::default()
        };

        let outcome = DisambiguationGraphBuilder::new(3)
            .unwrap()
            .with_budget(budget)
            .build(&set, &net)
            .unwrap();

        assert!(outcome.stats.truncated);
        assert!(outcome.graph.edge_count() <= 2);
        // Whatever was kept must be a complete seed-to-seed path
        for seed in ["A", "C", "D"] {
            assert!(outcome.graph.contains_vertex(net.sense_id(seed).unwrap()));
        }
    }

    #[test]
    fn test_expansion_budget_truncates() {
        let net = network(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["D"])]);
        let budget = SearchBudget {
            max_expansions: Some(1),
            ..Default::default()
        };

        let outcome = DisambiguationGraphBuilder::new(3)
            .unwrap()
            .with_budget(budget)
            .build(&set, &net)
            .unwrap();

        assert!(outcome.stats.truncated);
        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(outcome.graph.vertex_count(), 2);
    }

    #[test]
    fn test_expired_deadline_truncates() {
        let net = network(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["D"])]);
        let budget = SearchBudget {
            deadline: Some(Instant::now()),
            ..Default::default()
        };

        let outcome = DisambiguationGraphBuilder::new(3)
            .unwrap()
            .with_budget(budget)
            .build(&set, &net)
            .unwrap();

        assert!(outcome.stats.truncated);
        assert_eq!(outcome.graph.edge_count(), 0);
        for seed in ids(&net, &["A", "D"]) {
            assert!(outcome.graph.contains_vertex(seed));
        }
    }

    #[test]
    fn test_cancelled_build_is_an_error() {
        let net = network(&[("A", "B")]);
        let set = candidates(&net, &[("x", &["A"]), ("y", &["B"])]);
        let token = CancellationToken::new();
        token.cancel();

        let result = DisambiguationGraphBuilder::new(2)
            .unwrap()
            .with_budget(SearchBudget::unlimited().with_cancel(token))
            .build(&set, &net);

        assert!(matches!(result, Err(GraphError::Cancelled)));
    }
}
