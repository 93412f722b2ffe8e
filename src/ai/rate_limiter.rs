//! Sliding-window rate limiter for provider requests
//!
//! Admission and recording are separate steps: callers check with
//! [`RateLimiter::try_admit`] before building a prompt and only call
//! [`RateLimiter::record_request`] once the provider call is really issued.
//! Requests checked but never issued consume no quota, and a recorded request
//! whose call failed can be handed back with [`RateLimiter::release`].

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

/// Length of the sliding window
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct RateLimiter {
    limit: NonZeroU32,
    /// Issued request times, oldest first
    requests: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit: NonZeroU32) -> Self {
        Self {
            limit,
            requests: VecDeque::new(),
        }
    }

    pub fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    /// Whether another request may be issued right now
    pub fn try_admit(&mut self) -> bool {
        self.try_admit_at(Instant::now())
    }

    /// Whether another request may be issued at `now`.
    ///
    /// Prunes requests that have left the window; never records.
    pub fn try_admit_at(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.requests.len() < self.limit.get() as usize
    }

    /// Records a request issued now and returns its timestamp
    pub fn record_request(&mut self) -> Instant {
        let now = Instant::now();
        self.record_request_at(now);
        now
    }

    pub fn record_request_at(&mut self, now: Instant) {
        self.requests.push_back(now);
    }

    /// Drops the request recorded at `at`.
    ///
    /// Returns false when nothing was recorded at that time, which includes
    /// a request that has already left the window.
    pub fn release(&mut self, at: Instant) -> bool {
        match self.requests.iter().rposition(|&t| t == at) {
            Some(pos) => {
                self.requests.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Requests recorded within the window ending at `now`
    pub fn in_window_at(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.requests.len()
    }

    /// Total requests still held, without pruning
    pub fn recorded(&self) -> usize {
        self.requests.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.requests.front() {
            if now.saturating_duration_since(oldest) < RATE_WINDOW {
                break;
            }
            self.requests.pop_front();
        }
    }
}
