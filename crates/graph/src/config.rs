use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for one disambiguation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisambiguationConfig {
    /// Maximum path length (in hops) between two candidate senses
    pub max_depth: usize,

    /// Minimum degree a sense needs before it can be selected
    pub min_degree: usize,

    /// Cap on edges inserted into the disambiguation graph
    pub max_edges: Option<usize>,

    /// Cap on search steps across all traversals of one session
    pub max_expansions: Option<usize>,

    /// Wall-clock budget for building the disambiguation graph
    pub timeout_ms: Option<u64>,
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            min_degree: 1,
            max_edges: None,
            max_expansions: None,
            timeout_ms: None,
        }
    }
}

impl DisambiguationConfig {
    /// Short paths only, suited to network-scale graphs
    pub fn fast() -> Self {
        Self {
            max_depth: 2,
            max_expansions: Some(1_000_000),
            ..Default::default()
        }
    }

    /// Longer paths with a generous wall-clock guard
    pub fn thorough() -> Self {
        Self {
            max_depth: 3,
            max_edges: Some(100_000),
            timeout_ms: Some(30_000),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(GraphError::invalid_config("max_depth must be >= 1"));
        }

        if self.max_edges == Some(0) {
            return Err(GraphError::invalid_config("max_edges must be > 0 when set"));
        }

        if self.max_expansions == Some(0) {
            return Err(GraphError::invalid_config(
                "max_expansions must be > 0 when set",
            ));
        }

        if self.timeout_ms == Some(0) {
            return Err(GraphError::invalid_config("timeout_ms must be > 0 when set"));
        }

        if self.max_depth > 6 {
            log::warn!(
                "max_depth {} is large; search cost grows exponentially with depth",
                self.max_depth
            );
        }

        Ok(())
    }
}
