use crate::error::{GraphError, Result};
use crate::graph::{SenseGraph, SenseGraphBuilder};
use crate::intern::SenseId;
use crate::types::{PartOfSpeech, Sod};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Supplies candidate senses and the background sense network.
///
/// Implementations must hand out a fully built, immutable network so that
/// concurrent sessions can share it.
pub trait SenseSource: Send + Sync {
    /// Candidate senses for a term, in the resource's preferred order.
    /// An empty list is a normal answer; `Err` means the lookup itself failed.
    /// Every returned id must belong to [`SenseSource::global_graph`].
    fn candidate_senses(&self, sod: &Sod) -> Result<Vec<SenseId>>;

    fn global_graph(&self) -> Result<Arc<SenseGraph>>;
}

/// Sense source backed by an in-memory network and lexicon
#[derive(Debug, Clone)]
pub struct InMemorySenseSource {
    network: Arc<SenseGraph>,
    lexicon: HashMap<LexiconKey, Vec<SenseId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LexiconKey {
    lemma: String,
    pos: PartOfSpeech,
}

impl LexiconKey {
    fn new(term: &str, pos: &PartOfSpeech) -> Self {
        Self {
            lemma: term.trim().to_lowercase(),
            pos: pos.clone(),
        }
    }
}

impl InMemorySenseSource {
    pub fn builder() -> SenseSourceBuilder {
        SenseSourceBuilder::default()
    }

    pub fn network(&self) -> &Arc<SenseGraph> {
        &self.network
    }

    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    /// Load a JSON document holding senses, relations and lexicon together
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let document: NetworkDocument = serde_json::from_slice(&data)?;
        let source = document.into_source();
        log::info!(
            "Loaded sense network from {}: {} senses, {} relations, {} lexicon entries",
            path.display(),
            source.network.node_count(),
            source.network.edge_count(),
            source.lexicon_len()
        );
        Ok(source)
    }

    /// Load tab-separated relation and lexicon files.
    ///
    /// Relation lines are `sense_a<TAB>sense_b[<TAB>label]`; lexicon lines are
    /// `term<TAB>pos<TAB>sense,sense,...`. Blank lines and `#` comments are skipped.
    pub fn from_tsv_paths(relations: &Path, lexicon: &Path) -> Result<Self> {
        let mut builder = Self::builder();
        builder.read_relations_tsv(&fs::read_to_string(relations)?)?;
        builder.read_lexicon_tsv(&fs::read_to_string(lexicon)?)?;
        let source = builder.build();
        log::info!(
            "Loaded sense network from {} + {}: {} senses, {} relations, {} lexicon entries",
            relations.display(),
            lexicon.display(),
            source.network.node_count(),
            source.network.edge_count(),
            source.lexicon_len()
        );
        Ok(source)
    }
}

impl SenseSource for InMemorySenseSource {
    fn candidate_senses(&self, sod: &Sod) -> Result<Vec<SenseId>> {
        Ok(self
            .lexicon
            .get(&LexiconKey::new(&sod.term, &sod.pos))
            .cloned()
            .unwrap_or_default())
    }

    fn global_graph(&self) -> Result<Arc<SenseGraph>> {
        Ok(Arc::clone(&self.network))
    }
}

#[derive(Debug, Default)]
pub struct SenseSourceBuilder {
    network: SenseGraphBuilder,
    lexicon: HashMap<LexiconKey, Vec<SenseId>>,
}

impl SenseSourceBuilder {
    pub fn add_sense(&mut self, key: &str) -> SenseId {
        self.network.add_sense(key)
    }

    pub fn add_relation(&mut self, a: &str, b: &str) -> &mut Self {
        self.network.add_relation(a, b);
        self
    }

    /// Register senses for a term. Repeated calls append, skipping duplicates.
    pub fn add_lexeme(&mut self, term: &str, pos: PartOfSpeech, senses: &[&str]) -> &mut Self {
        let ids: Vec<SenseId> = senses.iter().map(|s| self.network.add_sense(s)).collect();
        let entry = self
            .lexicon
            .entry(LexiconKey::new(term, &pos))
            .or_default();
        for id in ids {
            if !entry.contains(&id) {
                entry.push(id);
            }
        }
        self
    }

    pub fn read_relations_tsv(&mut self, text: &str) -> Result<&mut Self> {
        for (line_no, line) in data_lines(text) {
            let mut cols = line.split('\t').map(str::trim);
            match (cols.next(), cols.next()) {
                (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
                    self.network.add_relation(a, b);
                }
                _ => {
                    return Err(GraphError::parse(
                        line_no,
                        "expected two tab-separated sense keys",
                    ))
                }
            }
        }
        Ok(self)
    }

    pub fn read_lexicon_tsv(&mut self, text: &str) -> Result<&mut Self> {
        for (line_no, line) in data_lines(text) {
            let cols: Vec<&str> = line.split('\t').map(str::trim).collect();
            if cols.len() < 2 || cols[0].is_empty() || cols[1].is_empty() {
                return Err(GraphError::parse(
                    line_no,
                    "expected term<TAB>pos<TAB>senses",
                ));
            }
            let senses: Vec<&str> = cols
                .get(2)
                .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
                .unwrap_or_default();
            let pos: PartOfSpeech = cols[1].to_string().into();
            self.add_lexeme(cols[0], pos, &senses);
        }
        Ok(self)
    }

    pub fn build(self) -> InMemorySenseSource {
        InMemorySenseSource {
            network: Arc::new(self.network.build()),
            lexicon: self.lexicon,
        }
    }
}

/// Non-empty, non-comment lines with 1-based line numbers
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkDocument {
    #[serde(default)]
    senses: Vec<String>,
    #[serde(default)]
    relations: Vec<(String, String)>,
    #[serde(default)]
    lexicon: Vec<LexiconDocumentEntry>,
}

#[derive(Debug, Deserialize)]
struct LexiconDocumentEntry {
    term: String,
    pos: PartOfSpeech,
    #[serde(default)]
    senses: Vec<String>,
}

impl NetworkDocument {
    fn into_source(self) -> InMemorySenseSource {
        let mut builder = InMemorySenseSource::builder();
        for sense in &self.senses {
            builder.add_sense(sense);
        }
        for (a, b) in &self.relations {
            builder.add_relation(a, b);
        }
        for entry in self.lexicon {
            let senses: Vec<&str> = entry.senses.iter().map(String::as_str).collect();
            builder.add_lexeme(&entry.term, entry.pos, &senses);
        }
        builder.build()
    }
}
