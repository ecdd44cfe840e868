//! Recording keystroke driver for testing.
//!
//! # Why a recording driver?
//!
//! The real driver (`SendInputDriver`) presses keys on the machine running
//! the tests, needs an interactive desktop, and cannot be observed from Rust
//! test code.
//!
//! `RecordingDriver` replaces every OS call with an in-memory record.  Each
//! call is pushed into a `Mutex<Vec<KeyEvent>>` so assertions can inspect
//! exactly what was injected and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let driver = Arc::new(RecordingDriver::new());
//! let injector = TextInjector::new(Arc::clone(&driver), transfer);
//!
//! injector.type_text("Hi").unwrap();
//!
//! assert_eq!(driver.typed_text(), "hi");
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every call return
//! `DriverError::Platform`, for testing error paths in callers.

use std::sync::Mutex;

use super::{DriverError, KeystrokeDriver};

/// One recorded driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Init,
    KeyDown(u16),
    KeyUp(u16),
    Char(char),
}

/// A driver that records all calls without touching the OS.
#[derive(Default)]
pub struct RecordingDriver {
    /// Every call, in order.
    pub events: Mutex<Vec<KeyEvent>>,
    /// When `true`, every method returns `DriverError::Platform`.
    pub should_fail: bool,
}

impl RecordingDriver {
    /// Creates a new driver with an empty record and `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<KeyEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Concatenation of every injected character.
    pub fn typed_text(&self) -> String {
        self.events
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter_map(|e| match e {
                KeyEvent::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: KeyEvent) -> Result<(), DriverError> {
        if self.should_fail {
            return Err(DriverError::Platform("recording driver failure".into()));
        }
        self.events.lock().expect("lock poisoned").push(event);
        Ok(())
    }
}

impl KeystrokeDriver for RecordingDriver {
    fn init(&self) -> Result<(), DriverError> {
        if self.should_fail {
            return Err(DriverError::Init("recording driver failure".into()));
        }
        self.record(KeyEvent::Init)
    }

    fn key_down(&self, vk: u16) -> Result<(), DriverError> {
        self.record(KeyEvent::KeyDown(vk))
    }

    fn key_up(&self, vk: u16) -> Result<(), DriverError> {
        self.record(KeyEvent::KeyUp(vk))
    }

    fn input_char(&self, ch: char) -> Result<(), DriverError> {
        self.record(KeyEvent::Char(ch))
    }
}
