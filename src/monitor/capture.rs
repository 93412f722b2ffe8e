//! Context capture sources

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use super::clipboard;
use super::speech::SpeechFeed;
use crate::ai::context::ContextSnapshot;
use crate::config::CaptureConfig;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to read window file {path}: {source}")]
    WindowFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid window file {path}: {source}")]
    WindowJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Capture worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Produces one context snapshot per call
pub trait ContextCapture: Send + Sync + 'static {
    fn capture(&self) -> impl Future<Output = Result<ContextSnapshot, CaptureError>> + Send;
}

/// Active window description written by an external helper
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    pub title: String,
    pub app: String,
    pub url: Option<String>,
}

impl WindowInfo {
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let contents = fs::read_to_string(path).map_err(|source| CaptureError::WindowFile {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| CaptureError::WindowJson {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Captures the desktop: window info file, clipboard and latest speech
#[derive(Debug, Clone)]
pub struct DesktopCapture {
    config: CaptureConfig,
    speech: Option<SpeechFeed>,
}

impl DesktopCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            speech: None,
        }
    }

    pub fn with_speech(mut self, feed: SpeechFeed) -> Self {
        self.speech = Some(feed);
        self
    }

    /// Window info, or an empty record when it cannot be read
    async fn active_window(&self) -> WindowInfo {
        let Some(path) = self.config.window_file.clone() else {
            return WindowInfo::default();
        };

        let loaded = tokio::task::spawn_blocking(move || WindowInfo::load(&path))
            .await
            .map_err(CaptureError::from)
            .and_then(|result| result);

        match loaded {
            Ok(window) => window,
            Err(e) => {
                log::warn!("Error capturing active window: {}", e);
                WindowInfo::default()
            }
        }
    }

    async fn clipboard_text(&self) -> Result<String, CaptureError> {
        tokio::task::spawn_blocking(clipboard::read_text).await?
    }
}

impl ContextCapture for DesktopCapture {
    async fn capture(&self) -> Result<ContextSnapshot, CaptureError> {
        let window = self.active_window().await;

        let mut snapshot = ContextSnapshot::new()
            .with_timestamp(Utc::now())
            .with_active_window(&window.title, &window.app, window.url.as_deref());

        if self.config.clipboard {
            let text = self.clipboard_text().await.unwrap_or_else(|e| {
                log::debug!("{}", e);
                String::new()
            });
            log::debug!(
                "Clipboard content: {}",
                if text.is_empty() { "Empty" } else { "Present" }
            );
            snapshot = snapshot.with_clipboard(text);
        }

        if self.config.audio
            && let Some(transcript) = self.speech.as_ref().and_then(SpeechFeed::latest)
        {
            snapshot = snapshot.with_speech(&transcript.text, transcript.timestamp);
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod capture_tests;
