use crate::intern::SenseId;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Coarse part-of-speech tag of a subject of disambiguation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    /// Any tag the lexical resource uses that has no coarse equivalent
    Other(String),
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &str {
        match self {
            PartOfSpeech::Noun => "n",
            PartOfSpeech::Verb => "v",
            PartOfSpeech::Adjective => "a",
            PartOfSpeech::Adverb => "r",
            PartOfSpeech::Other(tag) => tag,
        }
    }
}

impl FromStr for PartOfSpeech {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "n" | "noun" | "nn" => PartOfSpeech::Noun,
            "v" | "verb" | "vb" => PartOfSpeech::Verb,
            "a" | "s" | "adj" | "adjective" | "jj" => PartOfSpeech::Adjective,
            "r" | "adv" | "adverb" | "rb" => PartOfSpeech::Adverb,
            _ => PartOfSpeech::Other(tag),
        })
    }
}

impl From<String> for PartOfSpeech {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(pos) => pos,
            Err(never) => match never {},
        }
    }
}

impl From<PartOfSpeech> for String {
    fn from(value: PartOfSpeech) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject of disambiguation: a term and its part of speech
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sod {
    pub term: String,
    pub pos: PartOfSpeech,
}

impl Sod {
    pub fn new(term: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            term: term.into(),
            pos,
        }
    }
}

impl fmt::Display for Sod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.term, self.pos)
    }
}

/// A subject of disambiguation with its resolved candidate senses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub sod: Sod,

    /// Candidate senses in lexicon order (may be empty)
    pub senses: Vec<SenseId>,
}

impl Candidate {
    pub fn new(sod: Sod, senses: Vec<SenseId>) -> Self {
        Self { sod, senses }
    }
}

/// Ordered candidates of one context. Order drives tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Distinct senses of all candidates, in order of first appearance
    pub fn seed_senses(&self) -> Vec<SenseId> {
        let mut seen = HashSet::new();
        self.candidates
            .iter()
            .flat_map(|c| c.senses.iter().copied())
            .filter(|s| seen.insert(*s))
            .collect()
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Undirected edge identity, independent of endpoint order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UndirectedEdge(SenseId, SenseId);

impl UndirectedEdge {
    pub fn new(a: SenseId, b: SenseId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn endpoints(self) -> (SenseId, SenseId) {
        (self.0, self.1)
    }
}

/// Per-request evidence graph over candidate senses
#[derive(Debug, Clone, Default)]
pub struct DisambiguationGraph {
    graph: UnGraph<SenseId, ()>,
    sense_index: HashMap<SenseId, NodeIndex>,
    edges: HashSet<UndirectedEdge>,
}

impl DisambiguationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex; returns false when it was already present
    pub fn add_vertex(&mut self, sense: SenseId) -> bool {
        if self.sense_index.contains_key(&sense) {
            return false;
        }
        let idx = self.graph.add_node(sense);
        self.sense_index.insert(sense, idx);
        true
    }

    /// Add an undirected edge, creating missing endpoints.
    /// Returns false when the edge already existed.
    pub fn add_edge(&mut self, a: SenseId, b: SenseId) -> bool {
        if !self.edges.insert(UndirectedEdge::new(a, b)) {
            return false;
        }
        self.add_vertex(a);
        self.add_vertex(b);
        let (ia, ib) = (self.sense_index[&a], self.sense_index[&b]);
        self.graph.add_edge(ia, ib, ());
        true
    }

    pub fn contains_vertex(&self, sense: SenseId) -> bool {
        self.sense_index.contains_key(&sense)
    }

    pub fn contains_edge(&self, a: SenseId, b: SenseId) -> bool {
        self.edges.contains(&UndirectedEdge::new(a, b))
    }

    /// Number of incident edges; 0 for isolated or absent vertices
    pub fn degree(&self, sense: SenseId) -> usize {
        self.sense_index
            .get(&sense)
            .map(|&idx| self.graph.edges(idx).count())
            .unwrap_or(0)
    }

    /// Vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = SenseId> + '_ {
        self.graph.node_weights().copied()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = UndirectedEdge> + '_ {
        self.graph.raw_edges().iter().map(move |e| {
            UndirectedEdge::new(self.graph[e.source()], self.graph[e.target()])
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Degree of one candidate sense in the disambiguation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SenseScore {
    pub sense: SenseId,
    pub degree: usize,
}

/// Why a subject of disambiguation did not receive a sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The sense source knows no senses for the term
    EmptyCandidateList,

    /// Every candidate sense stayed below the minimum degree
    NoQualifyingCandidate { best_degree: usize },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::EmptyCandidateList => f.write_str("empty candidate list"),
            UnresolvedReason::NoQualifyingCandidate { best_degree } => {
                write!(f, "no candidate reached the minimum degree (best {best_degree})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved {
        sense: SenseId,
        degree: usize,
        confidence: f32,
    },
    Unresolved {
        reason: UnresolvedReason,
    },
}

impl Resolution {
    pub fn sense(&self) -> Option<SenseId> {
        match self {
            Resolution::Resolved { sense, .. } => Some(*sense),
            Resolution::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Outcome for one subject of disambiguation
#[derive(Debug, Clone, PartialEq)]
pub struct SenseAssignment {
    pub sod: Sod,
    pub resolution: Resolution,
}
