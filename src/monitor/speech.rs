//! Latest speech transcript
//!
//! A transcriber publishes recognized text; the capture reads whatever was
//! published last. Only the newest transcript is kept.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechTranscript {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// Create a connected publisher and feed with no transcript yet
pub fn speech_channel() -> (SpeechPublisher, SpeechFeed) {
    let (tx, rx) = watch::channel(None);
    (SpeechPublisher { tx }, SpeechFeed { rx })
}

#[derive(Debug)]
pub struct SpeechPublisher {
    tx: watch::Sender<Option<SpeechTranscript>>,
}

impl SpeechPublisher {
    /// Publish `text` stamped with the current time.
    ///
    /// Text is trimmed; blank transcripts are ignored and return `false`.
    pub fn publish(&self, text: &str) -> bool {
        self.publish_at(text, Utc::now())
    }

    pub fn publish_at(&self, text: &str, timestamp: DateTime<Utc>) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        self.tx.send_replace(Some(SpeechTranscript {
            timestamp,
            text: text.to_string(),
        }));
        log::debug!("Speech transcript updated ({} chars)", text.len());
        true
    }
}

#[derive(Debug, Clone)]
pub struct SpeechFeed {
    rx: watch::Receiver<Option<SpeechTranscript>>,
}

impl SpeechFeed {
    pub fn latest(&self) -> Option<SpeechTranscript> {
        self.rx.borrow().clone()
    }
}
