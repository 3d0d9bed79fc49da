use crate::builder::{BuildStats, CancellationToken, DisambiguationGraphBuilder, SearchBudget};
use crate::config::DisambiguationConfig;
use crate::error::{GraphError, Result};
use crate::graph::SenseGraph;
use crate::observer::{DisambiguationObserver, NoopObserver};
use crate::selector::CentralitySelector;
use crate::source::SenseSource;
use crate::types::{Candidate, CandidateSet, DisambiguationGraph, SenseAssignment, Sod};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs disambiguation sessions against one sense source.
///
/// Holds no per-session state; one instance can serve many threads.
#[derive(Clone)]
pub struct Disambiguator {
    source: Arc<dyn SenseSource>,
    config: DisambiguationConfig,
}

/// Result of disambiguating one context
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// One entry per input term, in input order
    pub assignments: Vec<SenseAssignment>,
    pub stats: BuildStats,
    pub evidence: DisambiguationGraph,
    network: Arc<SenseGraph>,
}

impl SessionReport {
    pub fn resolved(&self) -> impl Iterator<Item = &SenseAssignment> {
        self.assignments.iter().filter(|a| a.resolution.is_resolved())
    }

    pub fn sense_key(&self, assignment: &SenseAssignment) -> Option<&str> {
        assignment
            .resolution
            .sense()
            .and_then(|sense| self.network.sense_key(sense))
    }

    /// Map every term to its selected sense key, `None` when unresolved
    pub fn as_map(&self) -> HashMap<Sod, Option<String>> {
        self.assignments
            .iter()
            .map(|a| (a.sod.clone(), self.sense_key(a).map(str::to_string)))
            .collect()
    }

    pub fn network(&self) -> &SenseGraph {
        &self.network
    }
}

impl Disambiguator {
    pub fn new(source: Arc<dyn SenseSource>, config: DisambiguationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &DisambiguationConfig {
        &self.config
    }

    /// Look up candidate senses for every term. A failing lookup aborts, as
    /// does a sense the network does not contain.
    pub fn resolve_candidates(&self, sods: &[Sod]) -> Result<CandidateSet> {
        let network = self.network()?;
        self.candidates_in(sods, &network)
    }

    fn network(&self) -> Result<Arc<SenseGraph>> {
        self.source
            .global_graph()
            .map_err(|e| as_resource_failure(e, "sense network"))
    }

    fn candidates_in(&self, sods: &[Sod], network: &SenseGraph) -> Result<CandidateSet> {
        sods.iter()
            .map(|sod| {
                let senses = self
                    .source
                    .candidate_senses(sod)
                    .map_err(|e| as_resource_failure(e, &format!("candidate lookup for {sod}")))?;
                if let Some(stray) = senses.iter().find(|&&sense| !network.contains(sense)) {
                    return Err(GraphError::resource(format!(
                        "candidate lookup for {sod} returned sense {stray} outside the network"
                    )));
                }
                Ok(Candidate::new(sod.clone(), senses))
            })
            .collect()
    }

    pub fn disambiguate(&self, sods: &[Sod]) -> Result<SessionReport> {
        self.disambiguate_with(sods, &mut NoopObserver, None)
    }

    pub fn disambiguate_with(
        &self,
        sods: &[Sod],
        observer: &mut dyn DisambiguationObserver,
        cancel: Option<CancellationToken>,
    ) -> Result<SessionReport> {
        let network = self.network()?;
        let candidates = self.candidates_in(sods, &network)?;

        let mut budget = SearchBudget::from_config(&self.config);
        budget.cancel = cancel;

        let outcome = DisambiguationGraphBuilder::new(self.config.max_depth)?
            .with_budget(budget)
            .build_observed(&candidates, &network, observer)?;

        let assignments = CentralitySelector::new(self.config.min_degree).select_observed(
            &candidates,
            &outcome.graph,
            observer,
        );

        let resolved = assignments
            .iter()
            .filter(|a| a.resolution.is_resolved())
            .count();
        log::info!(
            "Disambiguated {resolved}/{} terms ({} edges, {} paths{})",
            assignments.len(),
            outcome.graph.edge_count(),
            outcome.stats.paths_found,
            if outcome.stats.truncated { ", truncated" } else { "" }
        );

        Ok(SessionReport {
            assignments,
            stats: outcome.stats,
            evidence: outcome.graph,
            network,
        })
    }
}

/// Any failure of the source makes the whole session impossible
fn as_resource_failure(err: GraphError, what: &str) -> GraphError {
    match err {
        GraphError::ResourceUnavailable(_) => err,
        other => GraphError::resource(format!("{what} failed: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::SenseId;
    use crate::source::InMemorySenseSource;
    use crate::types::{PartOfSpeech, Resolution, UnresolvedReason};

    struct BrokenSource;

    impl SenseSource for BrokenSource {
        fn candidate_senses(&self, _sod: &Sod) -> Result<Vec<SenseId>> {
            Ok(Vec::new())
        }

        fn global_graph(&self) -> Result<Arc<SenseGraph>> {
            Err(GraphError::resource("lexical resource failed to load"))
        }
    }

    struct FailingLookup(Arc<SenseGraph>);

    impl SenseSource for FailingLookup {
        fn candidate_senses(&self, sod: &Sod) -> Result<Vec<SenseId>> {
            Err(GraphError::Other(format!("index corrupt for {}", sod.term)))
        }

        fn global_graph(&self) -> Result<Arc<SenseGraph>> {
            Ok(Arc::clone(&self.0))
        }
    }

    struct StrayLookup(Arc<SenseGraph>);

    impl SenseSource for StrayLookup {
        fn candidate_senses(&self, _sod: &Sod) -> Result<Vec<SenseId>> {
            Ok(SenseId::from_index(self.0.node_count() + 5).into_iter().collect())
        }

        fn global_graph(&self) -> Result<Arc<SenseGraph>> {
            Ok(Arc::clone(&self.0))
        }
    }

    fn river_bank_source() -> Arc<dyn SenseSource> {
        let mut builder = InMemorySenseSource::builder();
        builder
            .add_relation("bank.n.01", "slope.n.01")
            .add_relation("slope.n.01", "river.n.01")
            .add_relation("bank.n.02", "institution.n.01")
            .add_lexeme("bank", PartOfSpeech::Noun, &["bank.n.02", "bank.n.01"])
            .add_lexeme("river", PartOfSpeech::Noun, &["river.n.01"]);
        Arc::new(builder.build())
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = DisambiguationConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(Disambiguator::new(river_bank_source(), config).is_err());
    }

    #[test]
    fn test_context_selects_connected_sense() {
        let disambiguator =
            Disambiguator::new(river_bank_source(), DisambiguationConfig::default()).unwrap();
        let sods = [
            Sod::new("bank", PartOfSpeech::Noun),
            Sod::new("river", PartOfSpeech::Noun),
            Sod::new("zebra", PartOfSpeech::Noun),
        ];

        let report = disambiguator.disambiguate(&sods).unwrap();
        let map = report.as_map();

        assert_eq!(map[&sods[0]].as_deref(), Some("bank.n.01"));
        assert_eq!(map[&sods[1]].as_deref(), Some("river.n.01"));
        assert_eq!(map[&sods[2]], None);
        assert_eq!(report.resolved().count(), 2);
        assert_eq!(
            report.assignments[2].resolution,
            Resolution::Unresolved {
                reason: UnresolvedReason::EmptyCandidateList
            }
        );
    }

    #[test]
    fn test_unavailable_network_aborts_session() {
        let disambiguator =
            Disambiguator::new(Arc::new(BrokenSource), DisambiguationConfig::default()).unwrap();
        let err = disambiguator
            .disambiguate(&[Sod::new("bank", PartOfSpeech::Noun)])
            .unwrap_err();
        assert!(matches!(err, GraphError::ResourceUnavailable(_)));
    }

    #[test]
    fn test_failing_lookup_aborts_session() {
        let source = FailingLookup(Arc::new(SenseGraph::default()));
        let disambiguator =
            Disambiguator::new(Arc::new(source), DisambiguationConfig::default()).unwrap();
        let err = disambiguator
            .disambiguate(&[Sod::new("bank", PartOfSpeech::Noun)])
            .unwrap_err();
        assert!(err.is_resource_failure());
    }

    #[test]
    fn test_sense_outside_network_aborts_session() {
        let mut builder = crate::graph::SenseGraphBuilder::new();
        builder.add_relation("bank.n.01", "river.n.01");
        let source = StrayLookup(Arc::new(builder.build()));
        let disambiguator =
            Disambiguator::new(Arc::new(source), DisambiguationConfig::default()).unwrap();
        let sods = [Sod::new("bank", PartOfSpeech::Noun)];

        assert!(matches!(
            disambiguator.resolve_candidates(&sods),
            Err(GraphError::ResourceUnavailable(_))
        ));
        let err = disambiguator.disambiguate(&sods).unwrap_err();
        assert!(err.to_string().contains("outside the network"));
    }

    #[test]
    fn test_cancelled_session_is_an_error() {
        let disambiguator =
            Disambiguator::new(river_bank_source(), DisambiguationConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = disambiguator.disambiguate_with(
            &[Sod::new("bank", PartOfSpeech::Noun), Sod::new("river", PartOfSpeech::Noun)],
            &mut NoopObserver,
            Some(token),
        );
        assert!(matches!(result, Err(GraphError::Cancelled)));
    }
}
