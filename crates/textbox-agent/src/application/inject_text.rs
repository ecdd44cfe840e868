//! TextInjector: replays response text as keystrokes into the focused window.
//!
//! This use case sits at the application layer and delegates to a
//! [`KeystrokeDriver`] trait object for the actual key events, and to a
//! [`TransferStore`] for the single-slot mailbox holding the last response.
//! The platform driver lives in the infrastructure layer.
//!
//! # Timing
//!
//! Injection is synchronous and blocking:
//!
//! 1. A fixed [`GRACE_PERIOD`] so the operator can click back into the target
//!    input field.
//! 2. One driver call per planned [`KeyAction`], with a short
//!    [`KEYSTROKE_INTERVAL`] after each character so the focused
//!    application's input handler keeps up.
//!
//! Callers on an async runtime must run it on a blocking thread.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use textbox_core::keystroke::{injected_char_count, plan_keystrokes, KeyAction};
use thiserror::Error;
use tracing::{debug, info};

/// Pause before the first keystroke so the operator can refocus the target.
pub const GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Pause after every injected character.
pub const KEYSTROKE_INTERVAL: Duration = Duration::from_millis(10);

/// Error type reported by a keystroke driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("keystroke driver initialization failed: {0}")]
    Init(String),
    #[error("keystroke injection failed: {0}")]
    Platform(String),
    #[error("no keystroke driver is available on this platform")]
    Unsupported,
}

/// Error type for the text injection use case.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The transfer file does not exist yet (no response has been stored).
    #[error("transfer file not found; no response has been stored yet")]
    TransferFileMissing,

    /// The transfer file exists but holds only whitespace.
    #[error("no text to type")]
    EmptyTransfer,

    /// The transfer file could not be read.
    #[error("failed to read transfer file: {0}")]
    Transfer(#[source] std::io::Error),

    /// The driver rejected a key event part-way through.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Native keystroke driver abstraction.
///
/// Virtual key code 16 ([`textbox_core::VK_SHIFT`]) is Shift.  The driver is
/// not expected to track Shift on its own; the injector presses and releases
/// it explicitly around uppercase characters.
pub trait KeystrokeDriver: Send + Sync {
    /// Prepares the driver.  Called once at startup; failure is fatal.
    fn init(&self) -> Result<(), DriverError>;

    /// Presses and holds a virtual key.
    fn key_down(&self, vk: u16) -> Result<(), DriverError>;

    /// Releases a virtual key.
    fn key_up(&self, vk: u16) -> Result<(), DriverError>;

    /// Types a single character through the active keyboard layout.
    fn input_char(&self, ch: char) -> Result<(), DriverError>;
}

/// Single-slot mailbox between the completion stage and the injection stage.
pub trait TransferStore: Send + Sync {
    /// Replaces the stored text.  Readers never observe a partial write.
    fn write(&self, text: &str) -> std::io::Result<()>;

    /// Returns the stored text, or `None` if nothing has been stored yet.
    fn read(&self) -> std::io::Result<Option<String>>;
}

/// The Text Injection use case.
pub struct TextInjector {
    driver: Arc<dyn KeystrokeDriver>,
    transfer: Arc<dyn TransferStore>,
    grace_period: Duration,
    keystroke_interval: Duration,
}

impl TextInjector {
    /// Creates an injector with the fixed grace period and pacing.
    pub fn new(driver: Arc<dyn KeystrokeDriver>, transfer: Arc<dyn TransferStore>) -> Self {
        Self {
            driver,
            transfer,
            grace_period: GRACE_PERIOD,
            keystroke_interval: KEYSTROKE_INTERVAL,
        }
    }

    /// Creates an injector without any delays, for unit tests.
    #[cfg(test)]
    pub(crate) fn without_delays(
        driver: Arc<dyn KeystrokeDriver>,
        transfer: Arc<dyn TransferStore>,
    ) -> Self {
        Self {
            driver,
            transfer,
            grace_period: Duration::ZERO,
            keystroke_interval: Duration::ZERO,
        }
    }

    /// Reads the transfer slot and types its trimmed content.
    ///
    /// Returns the number of characters injected.
    ///
    /// # Errors
    ///
    /// - [`InjectionError::TransferFileMissing`] if nothing has been stored.
    /// - [`InjectionError::EmptyTransfer`] if the stored text is blank.
    /// - [`InjectionError::Transfer`] for other read failures.
    /// - [`InjectionError::Driver`] if a key event fails.
    pub fn type_from_transfer(&self) -> Result<usize, InjectionError> {
        let text = self
            .transfer
            .read()
            .map_err(InjectionError::Transfer)?
            .ok_or(InjectionError::TransferFileMissing)?;
        self.type_text(&text)
    }

    /// Types `text` (trimmed) into the focused window.
    ///
    /// # Errors
    ///
    /// [`InjectionError::EmptyTransfer`] for blank text, otherwise
    /// [`InjectionError::Driver`] if a key event fails.
    pub fn type_text(&self, text: &str) -> Result<usize, InjectionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InjectionError::EmptyTransfer);
        }

        let plan = plan_keystrokes(text);

        info!(stage = "system", "preparing to type; switch to the target input area");
        thread::sleep(self.grace_period);

        let mut held: Option<u16> = None;
        for action in &plan {
            if let Err(e) = self.apply(*action) {
                // Never leave a modifier stuck down on the operator's keyboard.
                if let Some(vk) = held {
                    let _ = self.driver.key_up(vk);
                }
                return Err(e.into());
            }
            match action {
                KeyAction::KeyDown(vk) => held = Some(*vk),
                KeyAction::KeyUp(_) => held = None,
                KeyAction::Char(_) => {}
            }
        }

        let typed = injected_char_count(&plan);
        info!(stage = "system", chars = typed, "typing complete");
        Ok(typed)
    }

    fn apply(&self, action: KeyAction) -> Result<(), DriverError> {
        let result = match action {
            KeyAction::KeyDown(vk) => self.driver.key_down(vk),
            KeyAction::KeyUp(vk) => self.driver.key_up(vk),
            KeyAction::Char(ch) => self.driver.input_char(ch).map(|()| {
                if !self.keystroke_interval.is_zero() {
                    thread::sleep(self.keystroke_interval);
                }
            }),
        };
        if let Err(e) = &result {
            debug!("driver rejected {action:?}: {e}");
        }
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
