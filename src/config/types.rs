// Configuration type definitions

use std::num::{NonZeroU32, NonZeroU64};
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::ai_types::AiConfig;

const DEFAULT_RATE_LIMIT: NonZeroU32 = NonZeroU32::new(30).unwrap();
const DEFAULT_POLLING_INTERVAL_MS: NonZeroU64 = NonZeroU64::new(5000).unwrap();
const DEFAULT_CAPTURE_TIMEOUT_MS: NonZeroU64 = NonZeroU64::new(10_000).unwrap();

fn default_rate_limit() -> NonZeroU32 {
    DEFAULT_RATE_LIMIT
}

fn default_polling_interval_ms() -> NonZeroU64 {
    DEFAULT_POLLING_INTERVAL_MS
}

fn default_enable_caching() -> bool {
    true
}

fn default_max_cache_size() -> usize {
    100
}

fn default_clipboard() -> bool {
    true
}

fn default_capture_timeout_ms() -> NonZeroU64 {
    DEFAULT_CAPTURE_TIMEOUT_MS
}

/// Cost-saving settings section
///
/// Read once when a suggestion engine is built. Zero values for `rate_limit`
/// and `polling_interval_ms` are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CostSavingSettings {
    /// Maximum provider requests admitted per 60 second window
    #[serde(default = "default_rate_limit")]
    pub rate_limit: NonZeroU32,
    /// Delay between the end of one capture and the start of the next
    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: NonZeroU64,
    /// Whether suggestions are cached by context fingerprint
    #[serde(default = "default_enable_caching")]
    pub enable_caching: bool,
    /// Maximum number of cached suggestions
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,
}

impl CostSavingSettings {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms.get())
    }
}

impl Default for CostSavingSettings {
    fn default() -> Self {
        CostSavingSettings {
            rate_limit: default_rate_limit(),
            polling_interval_ms: default_polling_interval_ms(),
            enable_caching: default_enable_caching(),
            max_cache_size: default_max_cache_size(),
        }
    }
}

/// Context capture section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaptureConfig {
    /// Read the system clipboard on every capture
    #[serde(default = "default_clipboard")]
    pub clipboard: bool,
    /// JSON file describing the active window, kept up to date by an external helper
    #[serde(default)]
    pub window_file: Option<PathBuf>,
    /// Include recent speech in prompts
    #[serde(default)]
    pub audio: bool,
    /// Captures slower than this are abandoned. Zero is rejected at parse time.
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: NonZeroU64,
}

impl CaptureConfig {
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms.get())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            clipboard: default_clipboard(),
            window_file: None,
            audio: false,
            capture_timeout_ms: default_capture_timeout_ms(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cost_saving: CostSavingSettings,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
