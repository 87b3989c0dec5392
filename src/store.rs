//! Reading history
//!
//! Persistence is an external collaborator; the engine only appends through
//! the `ReadingStore` trait. `MemoryHistory` is the in-crate reference
//! implementation: a bounded, most-recent-first list with JSON save/load so
//! the host's storage layer can persist it opaquely.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::EngineError;
use crate::types::Reading;

/// Number of history entries retained; older entries are silently dropped
pub const HISTORY_CAPACITY: usize = 100;

/// Append-only sink for classified readings
pub trait ReadingStore {
    fn append(&mut self, reading: &Reading);

    /// Stored readings, most recent first
    fn list(&self) -> Vec<Reading>;

    fn clear(&mut self);
}

/// Bounded in-memory history, newest entries first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHistory {
    entries: VecDeque<Reading>,
    capacity: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ReadingStore for MemoryHistory {
    fn append(&mut self, reading: &Reading) {
        self.entries.push_front(reading.clone());
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    fn list(&self) -> Vec<Reading> {
        self.entries.iter().cloned().collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
