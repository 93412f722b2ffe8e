//! Suggestion engine
//!
//! Orchestrates one request per context snapshot:
//! fingerprint → cache lookup → rate-limit admission → prompt → provider →
//! cache insert. Settings are fixed at construction; a settings change means
//! building a new engine with an empty cache and rate window.
//!
//! The cache and rate window sit behind a mutex that is only held for
//! synchronous bookkeeping, never across the provider call, so several
//! snapshots can have provider calls in flight at once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;

use super::cache::SuggestionCache;
use super::context::ContextSnapshot;
use super::fingerprint::{Fingerprint, FingerprintError, fingerprint};
use super::prompt::{SYSTEM_INSTRUCTION, build_prompt};
use super::provider::{AiError, AsyncAiProvider, CompletionProvider, CompletionRequest};
use super::rate_limiter::RateLimiter;
use super::suggestion::CachedSuggestion;
use crate::config::{Config, CostSavingSettings};
use crate::usage::UsageStore;

/// Why a snapshot produced no suggestion
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("AI provider not configured")]
    NotConfigured,

    #[error(transparent)]
    SnapshotUnserializable(#[from] FingerprintError),

    #[error(transparent)]
    Provider(#[from] AiError),
}

/// Result of handling one snapshot
#[derive(Debug)]
pub enum SuggestionOutcome {
    /// Served from cache without contacting the provider
    Cached(Arc<CachedSuggestion>),
    /// Generated by the provider for this request
    Fresh(Arc<CachedSuggestion>),
    /// Declined because the rate window is full. Not an error.
    RateLimited,
    Failed(SuggestionError),
}

impl SuggestionOutcome {
    pub fn suggestion(&self) -> Option<&Arc<CachedSuggestion>> {
        match self {
            SuggestionOutcome::Cached(s) | SuggestionOutcome::Fresh(s) => Some(s),
            SuggestionOutcome::RateLimited | SuggestionOutcome::Failed(_) => None,
        }
    }

    pub fn into_suggestion(self) -> Option<Arc<CachedSuggestion>> {
        match self {
            SuggestionOutcome::Cached(s) | SuggestionOutcome::Fresh(s) => Some(s),
            SuggestionOutcome::RateLimited | SuggestionOutcome::Failed(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SuggestionOutcome::Cached(_) => "cached",
            SuggestionOutcome::Fresh(_) => "fresh",
            SuggestionOutcome::RateLimited => "rate-limited",
            SuggestionOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
struct EngineState {
    cache: SuggestionCache,
    limiter: RateLimiter,
}

#[derive(Debug)]
pub struct SuggestionEngine<P> {
    settings: CostSavingSettings,
    provider: Option<P>,
    usage: Arc<UsageStore>,
    audio_enabled: bool,
    state: Mutex<EngineState>,
}

impl SuggestionEngine<AsyncAiProvider> {
    /// Build an engine from a configuration snapshot.
    ///
    /// A missing credential leaves the engine unconfigured rather than failing.
    pub fn from_config(config: &Config, usage: Arc<UsageStore>) -> Self {
        let provider = match AsyncAiProvider::from_config(&config.ai) {
            Ok(provider) => {
                log::info!("{} provider initialized", provider.provider_name());
                Some(provider)
            }
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };

        Self::new(config.cost_saving, provider, usage).with_audio(config.capture.audio)
    }
}

impl<P: CompletionProvider> SuggestionEngine<P> {
    pub fn new(settings: CostSavingSettings, provider: Option<P>, usage: Arc<UsageStore>) -> Self {
        Self {
            settings,
            provider,
            usage,
            audio_enabled: false,
            state: Mutex::new(EngineState {
                cache: SuggestionCache::new(),
                limiter: RateLimiter::new(settings.rate_limit),
            }),
        }
    }

    /// Include recent speech in prompts
    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn settings(&self) -> &CostSavingSettings {
        &self.settings
    }

    pub fn usage(&self) -> &Arc<UsageStore> {
        &self.usage
    }

    pub fn cache_len(&self) -> usize {
        self.state().cache.len()
    }

    pub fn cached(&self, fingerprint: &Fingerprint) -> Option<Arc<CachedSuggestion>> {
        self.state().cache.get(fingerprint)
    }

    /// Provider requests issued within the last rate window
    pub fn requests_in_window(&self) -> usize {
        self.state().limiter.in_window_at(Instant::now())
    }

    /// Produce a suggestion for `snapshot`, or say why there is none.
    ///
    /// A rate-window slot is reserved when the provider call is issued and
    /// handed back if the call fails before the provider answers. The usage
    /// counter only moves once the provider has answered, even with no text.
    pub async fn generate(&self, snapshot: ContextSnapshot) -> SuggestionOutcome {
        let Some(provider) = &self.provider else {
            log::debug!("Skipping suggestion: AI provider not configured");
            return SuggestionOutcome::Failed(SuggestionError::NotConfigured);
        };

        let fingerprint = match fingerprint(&snapshot) {
            Ok(fp) => fp,
            Err(e) => {
                log::warn!("Cannot fingerprint context: {}", e);
                return SuggestionOutcome::Failed(e.into());
            }
        };

        let (request, reserved) = {
            let mut state = self.state();

            if self.settings.enable_caching
                && let Some(cached) = state.cache.get(&fingerprint)
            {
                log::debug!("Using cached suggestion for {}", fingerprint);
                return SuggestionOutcome::Cached(cached);
            }

            if !state.limiter.try_admit() {
                log::info!(
                    "Rate limit reached ({} per minute), skipping suggestion",
                    state.limiter.limit()
                );
                return SuggestionOutcome::RateLimited;
            }

            let prompt = build_prompt(&snapshot, self.audio_enabled);
            log::debug!("Built prompt for {}:\n{}", fingerprint, prompt);
            let reserved = state.limiter.record_request();
            (CompletionRequest::new(SYSTEM_INSTRUCTION, prompt), reserved)
        };

        let text = match provider.complete(&request).await {
            Ok(text) => text,
            Err(e @ AiError::EmptyResponse { .. }) => {
                self.record_usage().await;
                log::warn!("Error generating suggestion: {}", e);
                return SuggestionOutcome::Failed(e.into());
            }
            Err(e) => {
                self.state().limiter.release(reserved);
                log::warn!("Error generating suggestion: {}", e);
                return SuggestionOutcome::Failed(e.into());
            }
        };

        self.record_usage().await;

        if text.trim().is_empty() {
            let e = AiError::EmptyResponse {
                provider: provider.provider_name().to_string(),
            };
            log::warn!("Error generating suggestion: {}", e);
            return SuggestionOutcome::Failed(e.into());
        }

        let suggestion = Arc::new(CachedSuggestion {
            timestamp: Utc::now(),
            text,
            context: snapshot,
            fingerprint: fingerprint.clone(),
        });

        if self.settings.enable_caching {
            let mut state = self.state();
            state.cache.put(fingerprint, Arc::clone(&suggestion));
            let evicted = state.cache.evict_to_capacity(self.settings.max_cache_size);
            if evicted > 0 {
                log::debug!("Evicted {} cached suggestion(s)", evicted);
            }
        }

        SuggestionOutcome::Fresh(suggestion)
    }

    async fn record_usage(&self) {
        if let Err(e) = self.usage.record_request().await {
            log::warn!("Failed to record usage: {}", e);
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
