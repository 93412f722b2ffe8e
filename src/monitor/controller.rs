use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::capture::ContextCapture;
use super::loop_worker::monitor_loop;
use crate::ai::context::ContextSnapshot;

/// Delay between a start request and the first capture
pub const START_DEBOUNCE: Duration = Duration::from_millis(100);

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Owns the capture loop and the channel its snapshots are published on
pub struct MonitorController<C> {
    capture: Arc<C>,
    interval: Duration,
    capture_timeout: Duration,
    snapshots: broadcast::Sender<ContextSnapshot>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl<C: ContextCapture> MonitorController<C> {
    pub fn new(capture: C, interval: Duration, capture_timeout: Duration) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            capture: Arc::new(capture),
            interval,
            capture_timeout,
            snapshots,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContextSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replace the capture source and timings. Takes effect on the next `start`.
    pub fn reconfigure(&mut self, capture: C, interval: Duration, capture_timeout: Duration) {
        self.capture = Arc::new(capture);
        self.interval = interval;
        self.capture_timeout = capture_timeout;
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Begin capturing after [`START_DEBOUNCE`].
    ///
    /// Any loop already running or waiting to start is stopped first, so a
    /// burst of start requests results in a single loop.
    pub async fn start(&mut self) {
        self.stop().await;

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(debounced_loop(
            Arc::clone(&self.capture),
            self.snapshots.clone(),
            self.interval,
            self.capture_timeout,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
    }

    /// Cancel the loop and wait for it to exit
    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            log::error!("Context monitor task failed to join: {}", e);
        }
    }
}

impl<C> Drop for MonitorController<C> {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

async fn debounced_loop<C: ContextCapture>(
    capture: Arc<C>,
    snapshots: broadcast::Sender<ContextSnapshot>,
    interval: Duration,
    capture_timeout: Duration,
    cancel_token: CancellationToken,
) {
    tokio::select! {
        biased;

        _ = cancel_token.cancelled() => {
            log::debug!("Context monitor start superseded");
            return;
        }
        _ = tokio::time::sleep(START_DEBOUNCE) => {}
    }

    monitor_loop(capture, snapshots, interval, capture_timeout, cancel_token).await;
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
