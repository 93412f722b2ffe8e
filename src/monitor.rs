//! Context monitoring
//!
//! Periodically captures what the user is doing (active window, clipboard,
//! recent speech) and publishes each snapshot to subscribers.

mod capture;
mod clipboard;
mod controller;
mod loop_worker;
mod speech;

pub use capture::{CaptureError, ContextCapture, DesktopCapture, WindowInfo};
pub use controller::{MonitorController, START_DEBOUNCE};
pub use loop_worker::monitor_loop;
pub use speech::{SpeechFeed, SpeechPublisher, SpeechTranscript, speech_channel};
