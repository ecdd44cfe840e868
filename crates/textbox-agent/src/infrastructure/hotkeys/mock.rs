//! Mock hotkey source for unit testing.
//!
//! Allows tests to inject synthetic [`HotkeyAction`]s without registering
//! global hotkeys with the OS.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{HotkeyAction, HotkeyError, HotkeySource};

/// A mock implementation of [`HotkeySource`] that allows tests to inject actions.
#[derive(Clone, Default)]
pub struct MockHotkeySource {
    sender: Arc<Mutex<Option<UnboundedSender<HotkeyAction>>>>,
}

impl MockHotkeySource {
    /// Creates a new mock hotkey source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic action, as if the user pressed the hotkey.
    ///
    /// Panics if `start()` has not been called or the receiver was dropped.
    pub fn press(&self, action: HotkeyAction) {
        let guard = self.sender.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(sender) => sender
                .send(action)
                .expect("receiver has been dropped; call start() first"),
            None => panic!("MockHotkeySource::press called before start()"),
        }
    }

    /// Drops the sender, closing the channel.
    pub fn stop(&self) {
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

impl HotkeySource for MockHotkeySource {
    fn start(&self) -> Result<UnboundedReceiver<HotkeyAction>, HotkeyError> {
        let mut guard = self.sender.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(HotkeyError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *guard = Some(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_hotkey_source_delivers_actions_in_order() {
        // Arrange
        let source = MockHotkeySource::new();
        let mut rx = source.start().expect("start should succeed");

        // Act
        source.press(HotkeyAction::SendClipboard);
        source.press(HotkeyAction::Exit);

        // Assert
        assert_eq!(rx.recv().await, Some(HotkeyAction::SendClipboard));
        assert_eq!(rx.recv().await, Some(HotkeyAction::Exit));
    }

    #[tokio::test]
    async fn test_mock_hotkey_source_stop_closes_channel() {
        let source = MockHotkeySource::new();
        let mut rx = source.start().unwrap();

        source.stop();

        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_mock_hotkey_source_rejects_second_start() {
        let source = MockHotkeySource::new();
        let _rx = source.start().unwrap();
        assert!(matches!(source.start(), Err(HotkeyError::AlreadyStarted)));
    }
}
