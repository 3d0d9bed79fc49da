use anyhow::{anyhow, Context, Result};
use sense_graph::{InMemorySenseSource, Sod};
use serde::Deserialize;
use std::path::Path;

use crate::flags::NetworkFormat;

/// One context to disambiguate jointly
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ContextInput {
    pub id: String,
    pub terms: Vec<Sod>,
}

pub(crate) fn parse_contexts(text: &str) -> Result<Vec<ContextInput>> {
    let contexts: Vec<ContextInput> = serde_json::from_str(text)?;
    let mut seen = std::collections::HashSet::new();
    for context in &contexts {
        if !seen.insert(context.id.as_str()) {
            return Err(anyhow!("duplicate context id {:?}", context.id));
        }
    }
    Ok(contexts)
}

pub(crate) fn read_contexts(path: &Path) -> Result<Vec<ContextInput>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read contexts {}", path.display()))?;
    parse_contexts(&text).with_context(|| format!("Invalid contexts file {}", path.display()))
}

pub(crate) fn load_source(
    network: &Path,
    lexicon: Option<&Path>,
    format: NetworkFormat,
) -> Result<InMemorySenseSource> {
    let source = match format.resolve(network) {
        NetworkFormat::Json => {
            if lexicon.is_some() {
                log::warn!("--lexicon is ignored for JSON networks");
            }
            InMemorySenseSource::from_json_path(network)
        }
        _ => {
            let lexicon =
                lexicon.ok_or_else(|| anyhow!("TSV networks need --lexicon <FILE>"))?;
            InMemorySenseSource::from_tsv_paths(network, lexicon)
        }
    };
    source.with_context(|| format!("Failed to load sense network {}", network.display()))
}
