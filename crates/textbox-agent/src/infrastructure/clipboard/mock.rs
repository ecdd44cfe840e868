//! Mock clipboard for unit and integration testing.
//!
//! Tests queue up the values successive polls should observe.  Once the queue
//! is drained the last successfully read text keeps being returned, exactly
//! like a real clipboard that nobody touches.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ClipboardError, ClipboardSource};

/// A scripted [`ClipboardSource`].
#[derive(Default)]
pub struct MockClipboard {
    script: Mutex<VecDeque<Result<String, ClipboardError>>>,
    current: Mutex<String>,
    reads: Mutex<usize>,
}

impl MockClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clipboard that currently holds `text`.
    pub fn with_text(text: &str) -> Self {
        let clipboard = Self::default();
        clipboard.set_text(text);
        clipboard
    }

    /// Replaces the current content immediately.
    pub fn set_text(&self, text: &str) {
        self.script.lock().expect("lock poisoned").clear();
        *self.current.lock().expect("lock poisoned") = text.to_string();
    }

    /// Queues `text` to be observed by the next unscripted read.
    pub fn push_text(&self, text: &str) {
        self.script
            .lock()
            .expect("lock poisoned")
            .push_back(Ok(text.to_string()));
    }

    /// Queues a transient failure for the next unscripted read.
    pub fn push_failure(&self, reason: &str) {
        self.script
            .lock()
            .expect("lock poisoned")
            .push_back(Err(ClipboardError::Unavailable(reason.to_string())));
    }

    /// Returns how many times the clipboard has been read.
    pub fn read_count(&self) -> usize {
        *self.reads.lock().expect("lock poisoned")
    }
}

impl ClipboardSource for MockClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        *self.reads.lock().expect("lock poisoned") += 1;

        let next = self.script.lock().expect("lock poisoned").pop_front();
        match next {
            Some(Ok(text)) => {
                *self.current.lock().expect("lock poisoned") = text.clone();
                Ok(text)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.current.lock().expect("lock poisoned").clone()),
        }
    }
}
