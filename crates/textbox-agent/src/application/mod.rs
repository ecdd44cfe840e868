//! Application layer use cases for the agent.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules in `textbox-core`) and the infrastructure
//! (clipboard, HTTP, keyboard driver, files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain rules to fulfil a user goal (e.g., "answer the
//!   prompt on the clipboard and type the answer into the focused window").
//! - **Depend on abstractions** (traits defined here) rather than concrete
//!   implementations, so tests can swap in recording doubles.
//! - **Contain no OS calls and no network I/O**.
//!
//! # Sub-modules
//!
//! - **`dispatch`**        – The pipeline state machine: triggers, the
//!   single-cycle guard, the remote call, and the hand-off to injection.
//!
//! - **`watch_clipboard`** – The polling loop that feeds clipboard changes
//!   into the pipeline, plus the `ClipboardSource` abstraction.
//!
//! - **`inject_text`**     – Replays a response as paced keystrokes through a
//!   `KeystrokeDriver`.

pub mod dispatch;
pub mod inject_text;
pub mod watch_clipboard;
