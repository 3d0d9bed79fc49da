use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Interned sense identifier. Doubles as the node index in the sense network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SenseId(u32);

impl SenseId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `None` once the index no longer fits the id space
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for SenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// String table backing [`SenseId`]s.
#[derive(Debug, Clone, Default)]
pub struct SenseTable {
    keys: Vec<Box<str>>,
    ids: HashMap<Box<str>, SenseId>,
}

impl SenseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a sense key, returning the existing id if it was seen before.
    ///
    /// Panics when more keys are interned than a `u32` id can address,
    /// the same limit petgraph puts on node indices.
    pub fn intern(&mut self, key: &str) -> SenseId {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let Some(id) = SenseId::from_index(self.keys.len()) else {
            panic!("sense table exhausted: more than {} keys", u32::MAX as u64 + 1);
        };
        self.keys.push(key.into());
        self.ids.insert(key.into(), id);
        id
    }

    pub fn get(&self, key: &str) -> Option<SenseId> {
        self.ids.get(key).copied()
    }

    pub fn resolve(&self, id: SenseId) -> Option<&str> {
        self.keys.get(id.index()).map(|k| k.as_ref())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Ids in interning order
    pub fn ids(&self) -> impl Iterator<Item = SenseId> + '_ {
        (0u32..).zip(&self.keys).map(|(index, _)| SenseId(index))
    }
}
