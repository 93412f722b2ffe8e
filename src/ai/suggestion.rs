//! Generated suggestions

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::context::ContextSnapshot;
use super::fingerprint::Fingerprint;

/// A suggestion produced for one context snapshot
///
/// Immutable once built; the cache and callers share it behind an `Arc`.
/// Serving it from cache keeps the original `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedSuggestion {
    /// When the provider call completed
    pub timestamp: DateTime<Utc>,
    pub text: String,
    /// The snapshot the suggestion was generated for
    pub context: ContextSnapshot,
    pub fingerprint: Fingerprint,
}
