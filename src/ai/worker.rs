//! Suggestion pipeline
//!
//! Receives context snapshots from the monitor and hands each one to the
//! current suggestion engine on its own task, so a slow provider call never
//! holds up the next snapshot. Suggestions are forwarded to the presentation
//! layer over a channel.
//!
//! Reconfiguring swaps in a new engine. Calls already in flight on the old
//! engine run to completion but their results are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::context::ContextSnapshot;
use super::engine::{SuggestionEngine, SuggestionError, SuggestionOutcome};
use super::provider::CompletionProvider;
use super::suggestion::CachedSuggestion;

/// Control messages for a running pipeline
#[derive(Debug)]
pub enum PipelineCommand<P> {
    /// Replace the engine, discarding its cache and rate window
    Reconfigure(SuggestionEngine<P>),
}

/// A suggestion ready for display
#[derive(Debug, Clone)]
pub struct SuggestionEvent {
    pub suggestion: Arc<CachedSuggestion>,
    pub from_cache: bool,
}

/// Run the pipeline until cancelled or the snapshot channel closes
///
/// # Arguments
/// * `engine` - Initial suggestion engine
/// * `snapshots` - Context snapshots published by the monitor
/// * `commands` - Reconfiguration requests
/// * `suggestions` - Where generated and cached suggestions are delivered
/// * `cancel` - Stops the loop; in-flight calls are aborted
pub async fn run_pipeline<P: CompletionProvider>(
    engine: SuggestionEngine<P>,
    mut snapshots: broadcast::Receiver<ContextSnapshot>,
    mut commands: mpsc::Receiver<PipelineCommand<P>>,
    suggestions: mpsc::Sender<SuggestionEvent>,
    cancel: CancellationToken,
) {
    let mut engine = Arc::new(engine);
    let generation = Arc::new(AtomicU64::new(0));
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                log::debug!("Suggestion pipeline cancelled");
                break;
            }

            Some(command) = commands.recv() => match command {
                PipelineCommand::Reconfigure(next) => {
                    generation.fetch_add(1, Ordering::SeqCst);
                    engine = Arc::new(next);
                    log::info!("Suggestion engine reconfigured");
                }
            },

            received = snapshots.recv() => match received {
                Ok(snapshot) => {
                    let task = handle_snapshot(
                        Arc::clone(&engine),
                        snapshot,
                        Arc::clone(&generation),
                        suggestions.clone(),
                    );
                    tasks.spawn(task);
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Suggestion pipeline lagging, skipped {} snapshot(s)", skipped);
                }
                Err(RecvError::Closed) => {
                    log::debug!("Snapshot channel closed");
                    break;
                }
            },

            Some(joined) = tasks.join_next() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    log::error!("Suggestion task panicked: {}", e);
                }
            }
        }
    }

    tasks.abort_all();
}

/// Generate for one snapshot and forward the result if the engine is still current
async fn handle_snapshot<P: CompletionProvider>(
    engine: Arc<SuggestionEngine<P>>,
    snapshot: ContextSnapshot,
    generation: Arc<AtomicU64>,
    suggestions: mpsc::Sender<SuggestionEvent>,
) {
    let started_in = generation.load(Ordering::SeqCst);
    let outcome = engine.generate(snapshot).await;

    if generation.load(Ordering::SeqCst) != started_in {
        log::debug!("Dropping {} result from replaced engine", outcome.label());
        return;
    }

    let event = match outcome {
        SuggestionOutcome::Fresh(suggestion) => SuggestionEvent {
            suggestion,
            from_cache: false,
        },
        SuggestionOutcome::Cached(suggestion) => SuggestionEvent {
            suggestion,
            from_cache: true,
        },
        SuggestionOutcome::RateLimited | SuggestionOutcome::Failed(SuggestionError::NotConfigured) => {
            return;
        }
        SuggestionOutcome::Failed(e) => {
            log::debug!("No suggestion for this context: {}", e);
            return;
        }
    };

    if suggestions.send(event).await.is_err() {
        log::debug!("Suggestion receiver dropped");
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod worker_tests;
