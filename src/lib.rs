//! nudge library - context-aware suggestions
//!
//! This library exposes the capture, suggestion and usage-tracking pieces so
//! they can be driven by the binary and by integration tests.

pub mod ai;
pub mod config;
pub mod error;
pub mod monitor;
pub mod usage;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use ai::{CachedSuggestion, ContextSnapshot, SuggestionEngine};
pub use config::Config;
