//! Suggestion generation
//!
//! Turns context snapshots into short suggestions from a language model,
//! with fingerprint-keyed caching and a sliding-window request limit to keep
//! provider costs bounded.

pub mod cache;
pub mod context;
pub mod engine;
pub mod fingerprint;
pub mod prompt;
pub mod provider;
pub mod rate_limiter;
pub mod suggestion;
pub mod worker;

pub use context::ContextSnapshot;
pub use engine::{SuggestionEngine, SuggestionError, SuggestionOutcome};
pub use fingerprint::Fingerprint;
pub use suggestion::CachedSuggestion;
pub use worker::{PipelineCommand, SuggestionEvent, run_pipeline};
