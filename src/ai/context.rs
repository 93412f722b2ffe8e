//! Context snapshots
//!
//! A snapshot is an opaque JSON object describing what the user is doing at
//! capture time. Capture sources may add any fields they like; the accessors
//! here only read the handful of fields the prompt builder understands and
//! tolerate them being absent or of the wrong type.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known snapshot field names
pub mod fields {
    pub const TIMESTAMP: &str = "timestamp";
    pub const ACTIVE_WINDOW: &str = "active_window";
    pub const WINDOW_TITLE: &str = "title";
    pub const WINDOW_APP: &str = "app";
    pub const WINDOW_URL: &str = "url";
    pub const CLIPBOARD: &str = "clipboard_content";
    pub const AUDIO: &str = "audio";
    pub const AUDIO_TEXT: &str = "text";
}

/// Point-in-time capture of the user's environment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextSnapshot(Map<String, Value>);

/// Borrowed view of the `active_window` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow<'a> {
    pub title: &'a str,
    pub app: &'a str,
    pub url: Option<&'a str>,
}

impl ContextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an arbitrary JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        self.with_field(
            fields::TIMESTAMP,
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    pub fn with_active_window(self, title: &str, app: &str, url: Option<&str>) -> Self {
        let mut window = Map::new();
        window.insert(fields::WINDOW_TITLE.to_string(), title.into());
        window.insert(fields::WINDOW_APP.to_string(), app.into());
        if let Some(url) = url {
            window.insert(fields::WINDOW_URL.to_string(), url.into());
        }
        self.with_field(fields::ACTIVE_WINDOW, Value::Object(window))
    }

    pub fn with_clipboard(self, text: impl Into<String>) -> Self {
        self.with_field(fields::CLIPBOARD, text.into())
    }

    pub fn with_speech(self, text: &str, timestamp: DateTime<Utc>) -> Self {
        let mut audio = Map::new();
        audio.insert(
            fields::TIMESTAMP.to_string(),
            timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into(),
        );
        audio.insert(fields::AUDIO_TEXT.to_string(), text.into());
        self.with_field(fields::AUDIO, Value::Object(audio))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get(fields::TIMESTAMP)?.as_str()
    }

    /// The active window, when the snapshot carries one as an object.
    /// Missing title or app read as empty strings; a blank URL reads as none.
    pub fn active_window(&self) -> Option<ActiveWindow<'_>> {
        let window = self.get(fields::ACTIVE_WINDOW)?.as_object()?;
        let text = |key: &str| window.get(key).and_then(Value::as_str);

        Some(ActiveWindow {
            title: text(fields::WINDOW_TITLE).unwrap_or_default(),
            app: text(fields::WINDOW_APP).unwrap_or_default(),
            url: text(fields::WINDOW_URL).filter(|u| !u.is_empty()),
        })
    }

    /// Clipboard text, if present and non-empty
    pub fn clipboard_content(&self) -> Option<&str> {
        self.get(fields::CLIPBOARD)?
            .as_str()
            .filter(|text| !text.is_empty())
    }

    /// Recent speech text, if present and non-empty
    pub fn speech_text(&self) -> Option<&str> {
        self.get(fields::AUDIO)?
            .get(fields::AUDIO_TEXT)?
            .as_str()
            .filter(|text| !text.is_empty())
    }
}

impl From<Map<String, Value>> for ContextSnapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
