//! Prompt template generation
//!
//! Builds the prose prompt sent to the completion provider from a context
//! snapshot. Section order is fixed: window, URL, clipboard, speech, then the
//! closing instruction. Response quality depends on that order.

use super::context::ContextSnapshot;

/// System instruction sent alongside every prompt
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant that provides suggestions based on the user's current context.";

const HEADER: &str = "Based on the following context:\n\n";
const CLOSING_INSTRUCTION: &str = "Provide a helpful suggestion or action based on this context.";

/// Build a prompt from a context snapshot
///
/// Missing fields drop their section. Recent speech is only included when
/// audio monitoring is enabled.
pub fn build_prompt(snapshot: &ContextSnapshot, audio_enabled: bool) -> String {
    let mut prompt = String::from(HEADER);

    if let Some(window) = snapshot.active_window() {
        prompt.push_str(&format!(
            "Active window: {} ({})\n",
            window.title, window.app
        ));
        if let Some(url) = window.url {
            prompt.push_str(&format!("URL: {}\n", url));
        }
    }

    if let Some(clipboard) = snapshot.clipboard_content() {
        prompt.push_str(&format!("\nClipboard content:\n{}\n", clipboard));
    }

    if let Some(speech) = snapshot.speech_text().filter(|_| audio_enabled) {
        prompt.push_str(&format!("\nRecent speech:\n{}\n", speech));
    }

    prompt.push('\n');
    prompt.push_str(CLOSING_INSTRUCTION);

    prompt
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod prompt_tests;
