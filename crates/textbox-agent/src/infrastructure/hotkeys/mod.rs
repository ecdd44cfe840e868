//! Global hotkey infrastructure for the agent.
//!
//! On Windows, the three fixed bindings are registered with `RegisterHotKey`
//! on a dedicated Win32 message-loop thread.  `WM_HOTKEY` messages are turned
//! into [`HotkeyAction`]s and placed on an unbounded Tokio channel consumed by
//! the async runtime.
//!
//! # Testability
//!
//! The [`HotkeySource`] trait allows tests to inject synthetic actions
//! without registering anything with the OS.

use tokio::sync::mpsc::UnboundedReceiver;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// What a hotkey asks the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    /// Send the current clipboard text as a prompt.
    SendClipboard,
    /// Type the last stored response again.
    ReplayLast,
    /// Terminate the process.
    Exit,
}

/// Modifier keys held together with a binding's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// A fixed key combination mapped to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub action: HotkeyAction,
    pub modifiers: Modifiers,
    /// Uppercase ASCII letter; equal to its Windows virtual key code.
    pub key: char,
}

impl HotkeyBinding {
    /// Human-readable form, e.g. `"Ctrl+D"`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if self.modifiers.ctrl {
            parts.push("Ctrl".into());
        }
        if self.modifiers.alt {
            parts.push("Alt".into());
        }
        if self.modifiers.shift {
            parts.push("Shift".into());
        }
        parts.push(self.key.to_string());
        parts.join("+")
    }
}

const CTRL: Modifiers = Modifiers {
    ctrl: true,
    alt: false,
    shift: false,
};
const ALT: Modifiers = Modifiers {
    ctrl: false,
    alt: true,
    shift: false,
};

/// The agent's three fixed bindings.
pub const DEFAULT_BINDINGS: [HotkeyBinding; 3] = [
    HotkeyBinding {
        action: HotkeyAction::SendClipboard,
        modifiers: CTRL,
        key: 'D',
    },
    HotkeyBinding {
        action: HotkeyAction::ReplayLast,
        modifiers: CTRL,
        key: 'T',
    },
    HotkeyBinding {
        action: HotkeyAction::Exit,
        modifiers: ALT,
        key: 'Q',
    },
];

/// Error type for hotkey registration.
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("failed to register hotkey {binding}: {reason}")]
    RegistrationFailed { binding: String, reason: String },
    #[error("hotkey listener thread failed: {0}")]
    Listener(String),
    #[error("hotkey source has already been started")]
    AlreadyStarted,
    #[error("global hotkeys are not supported on this platform")]
    Unsupported,
}

/// Trait abstracting hotkey event production.
///
/// The production implementation uses `RegisterHotKey`; tests use
/// [`mock::MockHotkeySource`].
pub trait HotkeySource: Send {
    /// Registers the bindings and returns a receiver for triggered actions.
    ///
    /// Registration failures are reported here, before any action is
    /// delivered, so the caller can treat them as fatal.
    fn start(&self) -> Result<UnboundedReceiver<HotkeyAction>, HotkeyError>;
}

/// Hotkey source for platforms without global hotkey support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedHotkeySource;

impl HotkeySource for UnsupportedHotkeySource {
    fn start(&self) -> Result<UnboundedReceiver<HotkeyAction>, HotkeyError> {
        Err(HotkeyError::Unsupported)
    }
}

/// Returns the native hotkey source for the current platform.
pub fn platform_hotkeys() -> Box<dyn HotkeySource> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::RegisteredHotkeys::new(DEFAULT_BINDINGS.to_vec()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(UnsupportedHotkeySource)
    }
}
