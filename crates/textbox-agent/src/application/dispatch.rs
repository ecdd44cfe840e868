//! DispatchPipeline: decides when to call the completion endpoint and hands
//! the answer to the text injector.
//!
//! This is the most important use case in the agent.  Both hotkeys and every
//! clipboard poll go through [`DispatchPipeline::handle`].
//!
//! # State machine
//!
//! ```text
//!            start()
//!   Idle ───────────────► AwaitingTrigger ◄──────────────────────┐
//!                           │         │                          │
//!      SendClipboard /      │         │ ReplayLast               │
//!      ClipboardWatch(hit)  ▼         │                          │
//!                       Dispatching ──┼── failure (logged) ──────┤
//!                           │         │                          │
//!                 response  ▼         ▼                          │
//!                  stored  Injecting ─┴── done / failure ────────┘
//! ```
//!
//! There is no error state.  Any failure is logged with its stage and the
//! pipeline returns to `AwaitingTrigger`.
//!
//! # Concurrency
//!
//! The watcher task and the hotkey handlers share one pipeline.  Two pieces
//! of shared state are guarded:
//!
//! - **snapshot**: the last clipboard text seen.  Locked only long enough to
//!   compare and replace it.
//! - **cycle guard**: held for the whole `Dispatching`/`Injecting` sequence so
//!   that at most one cycle writes the transfer file at a time.  Hotkey
//!   triggers use `try_lock` and are rejected with a warning while a cycle is
//!   running; the watcher waits for the guard, so a detected sentinel prompt
//!   is never dropped.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use async_trait::async_trait;
use textbox_core::domain::prompt::{extract_sentinel_prompt, is_blank};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::inject_text::{TextInjector, TransferStore};
use super::watch_clipboard::ClipboardSource;

/// Fixed system instruction sent with every prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

/// One request to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
}

impl CompletionRequest {
    /// Builds a request carrying [`SYSTEM_INSTRUCTION`] and `prompt`.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt.into(),
        }
    }
}

/// Error type for the remote completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Connection, TLS, or timeout failure.
    #[error("request to completion endpoint failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned HTTP {status} ({summary})")]
    Status { status: u16, summary: String },

    /// The response body was not the expected JSON.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    /// The response carried no `choices`.
    #[error("completion response contained no choices")]
    NoChoices,

    /// The first choice had no text.
    #[error("completion response was empty")]
    EmptyResponse,

    /// The client could not be built from the configuration.
    #[error("invalid completion client configuration: {0}")]
    InvalidConfig(String),
}

/// Remote completion call abstraction.
///
/// The production implementation is
/// [`crate::infrastructure::completion::OpenAiClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one request and returns the trimmed response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Something that can start a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Hotkey A: send the clipboard verbatim.
    SendClipboard,
    /// One clipboard poll of the watcher loop.
    ClipboardWatch,
    /// Hotkey B: type the stored response again without a remote call.
    ReplayLast,
    /// Exit hotkey.  The pipeline only reports it; the caller ends the process.
    Exit,
}

/// Where the pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    AwaitingTrigger,
    Dispatching,
    Injecting,
}

/// How a trigger was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The response was typed; `chars` characters were injected.
    Completed { chars: usize },
    /// The prompt was empty or whitespace; no remote call was made.
    EmptyPrompt,
    /// Another cycle was in progress; the hotkey was ignored.
    Busy,
    /// The clipboard had not changed since the last poll.
    NoChange,
    /// The clipboard changed but does not start with the sentinel.
    NoSentinel,
    /// The clipboard could not be read this time.
    ClipboardUnavailable,
    /// The remote call failed; the transfer file was not touched.
    RemoteFailed,
    /// Storing or typing the response failed.
    InjectionFailed,
    /// The exit hotkey was pressed.
    Exit,
}

/// The dispatch pipeline use case.
pub struct DispatchPipeline {
    clipboard: Arc<dyn ClipboardSource>,
    completion: Arc<dyn CompletionClient>,
    transfer: Arc<dyn TransferStore>,
    injector: Arc<TextInjector>,
    snapshot: Mutex<String>,
    cycle_guard: Mutex<()>,
    state: StdMutex<PipelineState>,
}

impl DispatchPipeline {
    /// Creates a pipeline in the [`PipelineState::Idle`] state.
    pub fn new(
        clipboard: Arc<dyn ClipboardSource>,
        completion: Arc<dyn CompletionClient>,
        transfer: Arc<dyn TransferStore>,
        injector: Arc<TextInjector>,
    ) -> Self {
        Self {
            clipboard,
            completion,
            transfer,
            injector,
            snapshot: Mutex::new(String::new()),
            cycle_guard: Mutex::new(()),
            state: StdMutex::new(PipelineState::Idle),
        }
    }

    /// Moves the pipeline from `Idle` to `AwaitingTrigger`.
    pub fn start(&self) {
        self.set_state(PipelineState::AwaitingTrigger);
        info!(stage = "system", "dispatch pipeline ready");
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last clipboard text observed by the watcher or hotkey A.
    pub async fn last_seen_clipboard(&self) -> String {
        self.snapshot.lock().await.clone()
    }

    /// Handles one trigger to completion.
    pub async fn handle(&self, trigger: Trigger) -> CycleOutcome {
        match trigger {
            Trigger::SendClipboard => {
                let Ok(_guard) = self.cycle_guard.try_lock() else {
                    warn!(stage = "system", "a request is already in progress; ignoring hotkey");
                    return CycleOutcome::Busy;
                };
                self.send_clipboard().await
            }
            Trigger::ClipboardWatch => self.poll_clipboard().await,
            Trigger::ReplayLast => {
                let Ok(_guard) = self.cycle_guard.try_lock() else {
                    warn!(stage = "system", "a request is already in progress; ignoring hotkey");
                    return CycleOutcome::Busy;
                };
                self.inject().await
            }
            Trigger::Exit => {
                info!(stage = "system", "exit requested");
                CycleOutcome::Exit
            }
        }
    }

    /// Hotkey A.  Caller holds the cycle guard.
    async fn send_clipboard(&self) -> CycleOutcome {
        let text = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                error!(stage = "system", "error getting clipboard content: {e}");
                return CycleOutcome::ClipboardUnavailable;
            }
        };
        // Keep the watcher from firing again on the text we just sent.
        *self.snapshot.lock().await = text.clone();

        if is_blank(&text) {
            warn!(stage = "system", "clipboard is empty");
            return CycleOutcome::EmptyPrompt;
        }
        self.run_cycle(text.trim()).await
    }

    /// One watcher poll.
    async fn poll_clipboard(&self) -> CycleOutcome {
        let current = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(stage = "system", "clipboard monitoring error: {e}");
                return CycleOutcome::ClipboardUnavailable;
            }
        };

        {
            let mut snapshot = self.snapshot.lock().await;
            if *snapshot == current {
                return CycleOutcome::NoChange;
            }
            *snapshot = current.clone();
        }

        let Some(prompt) = extract_sentinel_prompt(&current) else {
            return CycleOutcome::NoSentinel;
        };
        info!(stage = "system", "GPT-prefixed content detected in clipboard");

        if is_blank(prompt) {
            warn!(stage = "system", "sentinel found but the prompt is empty");
            return CycleOutcome::EmptyPrompt;
        }

        let _guard = self.cycle_guard.lock().await;
        self.run_cycle(prompt).await
    }

    /// `Dispatching` followed by `Injecting`.  Caller holds the cycle guard.
    async fn run_cycle(&self, prompt: &str) -> CycleOutcome {
        self.set_state(PipelineState::Dispatching);
        info!(stage = "user", "{prompt}");

        let request = CompletionRequest::new(prompt);
        let response = match self.completion.complete(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!(stage = "gpt", "error in completion request: {e}");
                self.set_state(PipelineState::AwaitingTrigger);
                return CycleOutcome::RemoteFailed;
            }
        };
        if response.is_empty() {
            error!(stage = "gpt", "completion endpoint returned an empty response");
            self.set_state(PipelineState::AwaitingTrigger);
            return CycleOutcome::RemoteFailed;
        }

        info!(stage = "gpt", "{response}");
        info!(stage = "system", "{}", "-".repeat(50));

        if let Err(e) = self.transfer.write(&response) {
            error!(stage = "system", "failed to store response in transfer file: {e}");
            self.set_state(PipelineState::AwaitingTrigger);
            return CycleOutcome::InjectionFailed;
        }
        info!(stage = "system", "response saved to transfer file");

        self.inject().await
    }

    /// `Injecting`.  Caller holds the cycle guard.
    async fn inject(&self) -> CycleOutcome {
        self.set_state(PipelineState::Injecting);

        let injector = Arc::clone(&self.injector);
        let result = tokio::task::spawn_blocking(move || injector.type_from_transfer()).await;

        self.set_state(PipelineState::AwaitingTrigger);
        match result {
            Ok(Ok(chars)) => CycleOutcome::Completed { chars },
            Ok(Err(e)) => {
                error!(stage = "system", "error typing response: {e}");
                CycleOutcome::InjectionFailed
            }
            Err(e) => {
                error!(stage = "system", "injection task failed: {e}");
                CycleOutcome::InjectionFailed
            }
        }
    }

    fn set_state(&self, next: PipelineState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
