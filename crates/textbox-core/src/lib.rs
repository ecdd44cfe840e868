//! # textbox-core
//!
//! Shared library for TextBoxGPT containing the configuration model, the
//! encrypted configuration store, prompt extraction rules, and the keystroke
//! planner used by the text injector.
//!
//! This crate is used by both the agent and the provisioning tool.
//! It has zero dependencies on OS APIs, the clipboard, or the network.
//!
//! # Architecture overview (for beginners)
//!
//! TextBoxGPT watches the clipboard and a few global hotkeys, sends the
//! captured text to a chat-completions endpoint, and types the answer back
//! into whichever window has focus.  The credentials for the endpoint live on
//! disk as an encrypted blob next to a separate key file.
//!
//! This crate (`textbox-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The `Configuration` record and the rules that decide when
//!   clipboard text counts as a prompt (the `"GPT"` sentinel).
//!
//! - **`store`** – Authenticated encryption of a `Configuration` into a blob
//!   and back, with the key kept as a separate artifact.
//!
//! - **`keystroke`** – Pure translation of a response string into the exact
//!   sequence of key-down / key-up / character events the driver receives.

pub mod domain;
pub mod keystroke;
pub mod store;

// Re-export the most-used types at the crate root so callers can write
// `textbox_core::Configuration` instead of `textbox_core::domain::config::Configuration`.
pub use domain::config::{ConfigError, Configuration, DEFAULT_MODEL_NAME};
pub use domain::prompt::{extract_sentinel_prompt, PROMPT_SENTINEL};
pub use keystroke::{plan_keystrokes, KeyAction, VK_SHIFT};
pub use store::{decrypt, encrypt, generate_key, StoreError, SymmetricKey};
