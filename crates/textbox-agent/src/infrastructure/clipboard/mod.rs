//! System clipboard access.
//!
//! [`SystemClipboard`] opens the OS clipboard through `arboard` on every read
//! and closes it again straight away, so the agent never holds the clipboard
//! open while another application wants it.
//!
//! # Error mapping
//!
//! | `arboard` result                 | Returned value                       |
//! |----------------------------------|--------------------------------------|
//! | text                             | `Ok(text.trim())`                    |
//! | `ContentNotAvailable` (no text)  | `Ok("")`                             |
//! | anything else (locked, …)        | `Err(ClipboardError::Unavailable)`   |

pub mod mock;

use arboard::Clipboard;

pub use crate::application::watch_clipboard::{ClipboardError, ClipboardSource};

/// [`ClipboardSource`] backed by the real OS clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut clipboard =
            Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        normalize(clipboard.get_text())
    }
}

fn normalize(result: Result<String, arboard::Error>) -> Result<String, ClipboardError> {
    match result {
        Ok(text) => Ok(text.trim().to_string()),
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_text() {
        assert_eq!(normalize(Ok("  GPT hi \r\n".to_string())), Ok("GPT hi".to_string()));
    }

    #[test]
    fn test_normalize_maps_non_text_content_to_empty() {
        assert_eq!(normalize(Err(arboard::Error::ContentNotAvailable)), Ok(String::new()));
    }

    #[test]
    fn test_normalize_maps_other_errors_to_unavailable() {
        let result = normalize(Err(arboard::Error::ClipboardOccupied));
        assert!(matches!(result, Err(ClipboardError::Unavailable(_))));
    }
}
