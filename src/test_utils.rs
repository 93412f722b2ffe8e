//! Shared test utilities
//!
//! Fixtures and a scripted completion provider used by the engine, pipeline
//! and monitor tests.

#[cfg(test)]
pub mod test_helpers {
    use std::num::NonZeroU32;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::Semaphore;
    use tokio::time::Duration;

    use crate::ai::context::ContextSnapshot;
    use crate::ai::engine::SuggestionEngine;
    use crate::ai::provider::{AiError, CompletionProvider, CompletionRequest};
    use crate::config::CostSavingSettings;
    use crate::monitor::{CaptureError, ContextCapture};
    use crate::usage::UsageStore;

    /// Helper to run async tests with a tokio runtime
    pub fn run_async<F: std::future::Future>(f: F) -> F::Output {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime");
        rt.block_on(f)
    }

    /// Like `run_async`, but with the clock paused so sleeps resolve instantly
    pub fn run_paused<F: std::future::Future>(f: F) -> F::Output {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .expect("Failed to create tokio runtime");
        rt.block_on(f)
    }

    /// Completion provider with a scripted reply that records every request
    #[derive(Debug, Clone)]
    pub struct FakeProvider {
        reply: Option<String>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Semaphore>>,
    }

    impl FakeProvider {
        /// Answers every request with `text`
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                requests: Arc::default(),
                calls: Arc::default(),
                gate: None,
            }
        }

        /// Fails every request with a network error
        pub fn failing() -> Self {
            Self {
                reply: None,
                ..Self::replying("")
            }
        }

        /// Holds each call until a permit is added to the returned semaphore
        pub fn gated(text: &str) -> (Self, Arc<Semaphore>) {
            let gate = Arc::new(Semaphore::new(0));
            let provider = Self {
                gate: Some(Arc::clone(&gate)),
                ..Self::replying(text)
            };
            (provider, gate)
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CompletionProvider for FakeProvider {
        fn provider_name(&self) -> &'static str {
            "Fake"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());

            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }

            self.reply.clone().ok_or_else(|| AiError::Network {
                provider: "Fake".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    pub fn settings(rate_limit: u32, enable_caching: bool, max_cache_size: usize) -> CostSavingSettings {
        CostSavingSettings {
            rate_limit: NonZeroU32::new(rate_limit).unwrap(),
            enable_caching,
            max_cache_size,
            ..CostSavingSettings::default()
        }
    }

    pub fn engine(provider: FakeProvider, settings: CostSavingSettings) -> SuggestionEngine<FakeProvider> {
        SuggestionEngine::new(settings, Some(provider), Arc::new(UsageStore::in_memory()))
    }

    /// Snapshot that differs only by window title
    pub fn snapshot(title: &str) -> ContextSnapshot {
        ContextSnapshot::new().with_active_window(title, "Terminal", None)
    }

    /// Capture source that numbers its snapshots with a `seq` field
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedCapture {
        delay: Duration,
        fail: bool,
        attempts: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl ScriptedCapture {
        pub fn instant() -> Self {
            Self::default()
        }

        /// Each capture sleeps for `delay` before answering
        pub fn taking(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Captures started so far
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    impl ContextCapture for ScriptedCapture {
        async fn capture(&self) -> Result<ContextSnapshot, CaptureError> {
            let seq = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                return Err(CaptureError::Clipboard("scripted failure".to_string()));
            }
            Ok(ContextSnapshot::new().with_field("seq", seq))
        }
    }
}
