use crate::observer::{DisambiguationObserver, NoopObserver};
use crate::types::{
    Candidate, CandidateSet, DisambiguationGraph, Resolution, SenseAssignment, SenseScore,
    UnresolvedReason,
};

/// Confidence attached to every resolved sense; selection is a single best guess
pub const RESOLVED_CONFIDENCE: f32 = 1.0;

/// Picks the best connected candidate sense per subject of disambiguation.
///
/// Ties on the highest qualifying degree go to the sense listed first in the
/// candidate's sense list. That order comes from the sense source, so the
/// outcome is reproducible across runs.
#[derive(Debug, Clone, Copy)]
pub struct CentralitySelector {
    min_degree: usize,
}

impl CentralitySelector {
    pub fn new(min_degree: usize) -> Self {
        Self { min_degree }
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Degree of every candidate sense, in candidate order
    pub fn scores(&self, candidate: &Candidate, graph: &DisambiguationGraph) -> Vec<SenseScore> {
        candidate
            .senses
            .iter()
            .map(|&sense| SenseScore {
                sense,
                degree: graph.degree(sense),
            })
            .collect()
    }

    pub fn resolve(&self, candidate: &Candidate, graph: &DisambiguationGraph) -> Resolution {
        if candidate.senses.is_empty() {
            return Resolution::Unresolved {
                reason: UnresolvedReason::EmptyCandidateList,
            };
        }

        let mut best: Option<SenseScore> = None;
        let mut best_degree = 0;
        for score in self.scores(candidate, graph) {
            best_degree = best_degree.max(score.degree);
            if score.degree < self.min_degree {
                continue;
            }
            // Strictly greater: earlier candidates keep ties
            if best.map_or(true, |b| score.degree > b.degree) {
                best = Some(score);
            }
        }

        match best {
            Some(score) => Resolution::Resolved {
                sense: score.sense,
                degree: score.degree,
                confidence: RESOLVED_CONFIDENCE,
            },
            None => Resolution::Unresolved {
                reason: UnresolvedReason::NoQualifyingCandidate { best_degree },
            },
        }
    }

    pub fn select(
        &self,
        candidates: &CandidateSet,
        graph: &DisambiguationGraph,
    ) -> Vec<SenseAssignment> {
        self.select_observed(candidates, graph, &mut NoopObserver)
    }

    /// One assignment per candidate, in candidate order
    pub fn select_observed(
        &self,
        candidates: &CandidateSet,
        graph: &DisambiguationGraph,
        observer: &mut dyn DisambiguationObserver,
    ) -> Vec<SenseAssignment> {
        candidates
            .iter()
            .map(|candidate| {
                let resolution = self.resolve(candidate, graph);
                if let Resolution::Unresolved { reason } = &resolution {
                    log::debug!("{} left unresolved: {reason}", candidate.sod);
                }
                observer.selection_made(&candidate.sod, resolution.sense());
                SenseAssignment {
                    sod: candidate.sod.clone(),
                    resolution,
                }
            })
            .collect()
    }
}

impl Default for CentralitySelector {
    fn default() -> Self {
        Self::new(1)
    }
}
