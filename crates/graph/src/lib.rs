//! # Sense Graph
//!
//! Word sense disambiguation through graph connectivity.
//!
//! ## Features
//!
//! - **Interned sense network** - compact undirected graph over sense ids
//! - **Bounded path discovery** - depth-limited DFS between candidate senses
//! - **Degree centrality** - pick the best connected sense per term
//! - **Budgets & cancellation** - cap edges, steps and wall-clock per session
//!
//! ## Architecture
//!
//! ```text
//! Sod[] (term + part of speech)
//!     │
//!     ├──> SenseSource
//!     │      ├─ Candidate senses per term
//!     │      └─ Shared, read-only SenseGraph (petgraph)
//!     │
//!     ├──> DisambiguationGraphBuilder
//!     │      ├─ Seed every candidate sense
//!     │      ├─ Bounded DFS from each seed towards the others
//!     │      └─ Keep only edges of seed-to-seed paths
//!     │
//!     └──> CentralitySelector
//!            ├─ Degree of each candidate sense
//!            ├─ Highest degree >= min_degree wins
//!            └─ Ties go to the first listed sense
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sense_graph::{DisambiguationConfig, Disambiguator, InMemorySenseSource, PartOfSpeech, Sod};
//! use std::sync::Arc;
//!
//! let mut source = InMemorySenseSource::builder();
//! source
//!     .add_relation("bank.n.01", "slope.n.01")
//!     .add_relation("slope.n.01", "river.n.01")
//!     .add_lexeme("bank", PartOfSpeech::Noun, &["bank.n.02", "bank.n.01"])
//!     .add_lexeme("river", PartOfSpeech::Noun, &["river.n.01"]);
//!
//! let disambiguator =
//!     Disambiguator::new(Arc::new(source.build()), DisambiguationConfig::default()).unwrap();
//! let report = disambiguator
//!     .disambiguate(&[Sod::new("bank", PartOfSpeech::Noun), Sod::new("river", PartOfSpeech::Noun)])
//!     .unwrap();
//!
//! assert_eq!(report.sense_key(&report.assignments[0]), Some("bank.n.01"));
//! ```

mod builder;
mod config;
mod error;
mod graph;
mod intern;
mod observer;
mod selector;
mod session;
mod source;
mod types;

pub use builder::{
    BuildOutcome, BuildStats, CancellationToken, DisambiguationGraphBuilder, SearchBudget,
};
pub use config::DisambiguationConfig;
pub use error::{GraphError, Result};
pub use graph::{SenseGraph, SenseGraphBuilder};
pub use intern::{SenseId, SenseTable};
pub use observer::{
    DisambiguationObserver, LoggingObserver, NoopObserver, ObserverEvent, RecordingObserver,
};
pub use selector::{CentralitySelector, RESOLVED_CONFIDENCE};
pub use session::{Disambiguator, SessionReport};
pub use source::{InMemorySenseSource, SenseSource, SenseSourceBuilder};
pub use types::{
    Candidate, CandidateSet, DisambiguationGraph, PartOfSpeech, Resolution, SenseAssignment,
    SenseScore, Sod, UndirectedEdge, UnresolvedReason,
};
