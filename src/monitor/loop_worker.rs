use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::capture::ContextCapture;
use crate::ai::context::ContextSnapshot;

/// Capture, publish, wait `interval`, repeat until cancelled.
///
/// The wait starts after a capture finishes, so captures never overlap. A
/// capture slower than `capture_timeout` is abandoned and the loop carries on.
pub async fn monitor_loop<C: ContextCapture>(
    capture: Arc<C>,
    snapshots: broadcast::Sender<ContextSnapshot>,
    interval: Duration,
    capture_timeout: Duration,
    cancel_token: CancellationToken,
) {
    log::info!("Context monitor started, polling every {}ms", interval.as_millis());

    loop {
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => break,

            result = tokio::time::timeout(capture_timeout, capture.capture()) => match result {
                Ok(Ok(snapshot)) => {
                    log::debug!("Captured context with {} field(s)", snapshot.len());
                    if snapshots.send(snapshot).is_err() {
                        log::debug!("No context subscribers");
                    }
                }
                Ok(Err(err)) => log::error!("Error capturing context: {}", err),
                Err(_) => log::warn!(
                    "Context capture timeout (> {}ms)",
                    capture_timeout.as_millis()
                ),
            }
        }

        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    log::info!("Context monitor shutting down");
}
