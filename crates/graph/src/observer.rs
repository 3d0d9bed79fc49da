use crate::intern::SenseId;
use crate::types::Sod;

/// Hooks into graph construction and selection, e.g. for visualization.
///
/// Every method defaults to a no-op. Observers see events but cannot
/// influence which paths are kept or which sense is selected.
pub trait DisambiguationObserver {
    fn vertex_added(&mut self, _sense: SenseId) {}

    fn edge_added(&mut self, _a: SenseId, _b: SenseId) {}

    /// A seed-to-seed path was accepted; `path` runs from root to goal
    fn path_accepted(&mut self, _path: &[SenseId]) {}

    fn selection_made(&mut self, _sod: &Sod, _sense: Option<SenseId>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DisambiguationObserver for NoopObserver {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    VertexAdded(SenseId),
    EdgeAdded(SenseId, SenseId),
    PathAccepted(Vec<SenseId>),
    SelectionMade(Sod, Option<SenseId>),
}

/// Keeps every event in arrival order
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<ObserverEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted_paths(&self) -> impl Iterator<Item = &[SenseId]> {
        self.events.iter().filter_map(|e| match e {
            ObserverEvent::PathAccepted(path) => Some(path.as_slice()),
            _ => None,
        })
    }
}

impl DisambiguationObserver for RecordingObserver {
    fn vertex_added(&mut self, sense: SenseId) {
        self.events.push(ObserverEvent::VertexAdded(sense));
    }

    fn edge_added(&mut self, a: SenseId, b: SenseId) {
        self.events.push(ObserverEvent::EdgeAdded(a, b));
    }

    fn path_accepted(&mut self, path: &[SenseId]) {
        self.events.push(ObserverEvent::PathAccepted(path.to_vec()));
    }

    fn selection_made(&mut self, sod: &Sod, sense: Option<SenseId>) {
        self.events.push(ObserverEvent::SelectionMade(sod.clone(), sense));
    }
}

/// Emits every event at trace level
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl DisambiguationObserver for LoggingObserver {
    fn edge_added(&mut self, a: SenseId, b: SenseId) {
        log::trace!("edge added {a} -- {b}");
    }

    fn path_accepted(&mut self, path: &[SenseId]) {
        log::trace!("path accepted ({} hops): {:?}", path.len().saturating_sub(1), path);
    }

    fn selection_made(&mut self, sod: &Sod, sense: Option<SenseId>) {
        match sense {
            Some(sense) => log::trace!("{sod} -> {sense}"),
            None => log::trace!("{sod} unresolved"),
        }
    }
}
