use arboard::Clipboard;

use super::capture::CaptureError;

/// Read the system clipboard as text. Non-text content reads as empty.
pub fn read_text() -> Result<String, CaptureError> {
    let mut clipboard = Clipboard::new().map_err(|e| CaptureError::Clipboard(e.to_string()))?;

    match clipboard.get_text() {
        Ok(text) => Ok(text),
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(CaptureError::Clipboard(e.to_string())),
    }
}
