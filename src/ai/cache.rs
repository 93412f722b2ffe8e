//! Suggestion cache
//!
//! Bounded fingerprint → suggestion map. Eviction is FIFO by insertion: reads
//! never renew an entry, and overwriting a key keeps its original place in
//! line. Insertion order is tracked explicitly rather than relying on map
//! iteration order.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::fingerprint::Fingerprint;
use super::suggestion::CachedSuggestion;

#[derive(Debug, Default)]
pub struct SuggestionCache {
    entries: HashMap<Fingerprint, Arc<CachedSuggestion>>,
    /// Keys oldest first; always holds exactly the keys of `entries`
    order: VecDeque<Fingerprint>,
}

impl SuggestionCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<CachedSuggestion>> {
        self.entries.get(fingerprint).cloned()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Insert or overwrite. Does not evict; see [`Self::evict_to_capacity`].
    pub fn put(&mut self, fingerprint: Fingerprint, suggestion: Arc<CachedSuggestion>) {
        if self
            .entries
            .insert(fingerprint.clone(), suggestion)
            .is_none()
        {
            self.order.push_back(fingerprint);
        }
    }

    /// Drop the oldest entries until at most `capacity` remain.
    ///
    /// Returns how many entries were removed.
    pub fn evict_to_capacity(&mut self, capacity: usize) -> usize {
        let mut evicted = 0;
        while self.entries.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprints in eviction order, oldest first
    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }
}
