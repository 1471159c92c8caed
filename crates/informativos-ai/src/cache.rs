use std::collections::HashMap;

use crate::prompt::Purpose;

/// Stored outcome of one generation. A missing entry means never requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Ready(String),
    /// User-facing message of the failure; kept so the request is not retried
    /// until the entry is cleared.
    Failed(String),
}

/// Generated text per (record id, purpose), for the life of a session.
#[derive(Debug, Clone, Default)]
pub struct GenerationCache {
    entries: HashMap<(String, Purpose), Generation>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str, purpose: Purpose) -> Option<&Generation> {
        self.entries.get(&(id.to_string(), purpose))
    }

    pub fn insert(&mut self, id: &str, purpose: Purpose, generation: Generation) {
        self.entries.insert((id.to_string(), purpose), generation);
    }

    pub fn clear(&mut self, id: &str, purpose: Purpose) -> Option<Generation> {
        self.entries.remove(&(id.to_string(), purpose))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
