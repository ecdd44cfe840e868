//! Infrastructure layer for the agent.
//!
//! Contains OS-facing and network-facing adapters for the traits defined in
//! the application layer.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `textbox_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.
//!
//! # Sub-modules
//!
//! - **`clipboard`** – `arboard`-backed [`ClipboardSource`] plus a scripted mock.
//!
//! - **`completion`** – `reqwest` client for OpenAI-compatible chat-completions
//!   endpoints.
//!
//! - **`hotkeys`** – global hotkey registration.  On Windows it calls
//!   `RegisterHotKey` on a dedicated message-loop thread.
//!
//! - **`keystroke`** – OS-specific [`KeystrokeDriver`] implementations selected
//!   with `#[cfg(target_os)]`, plus a recording driver for tests.
//!
//! - **`logging`** – console and daily-file `tracing` sinks.
//!
//! - **`storage`** – loads the key file and encrypted blob that sit next to
//!   the executable.
//!
//! - **`transfer`** – the `output.txt` transfer slot in the working directory.
//!
//! [`ClipboardSource`]: crate::application::watch_clipboard::ClipboardSource
//! [`KeystrokeDriver`]: crate::application::inject_text::KeystrokeDriver

pub mod clipboard;
pub mod completion;
pub mod hotkeys;
pub mod keystroke;
pub mod logging;
pub mod storage;
pub mod transfer;
