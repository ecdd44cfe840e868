//! Clipboard watcher: the autonomous trigger of the dispatch pipeline.
//!
//! Polls the clipboard on a fixed interval and hands every poll to
//! [`DispatchPipeline::handle`] as a [`Trigger::ClipboardWatch`].  Change
//! detection, sentinel matching and the snapshot update live in the pipeline
//! so the hotkey path and the watcher share one last-seen cell.
//!
//! The loop never exits on its own: transient clipboard failures come back as
//! [`CycleOutcome::ClipboardUnavailable`] and the next tick simply retries.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::dispatch::{CycleOutcome, DispatchPipeline, Trigger};

/// Fixed interval between clipboard polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Error type for clipboard reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The clipboard is temporarily inaccessible (e.g. locked by another
    /// process).  Always transient: the caller skips this poll.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the system clipboard.
///
/// The production implementation is
/// [`crate::infrastructure::clipboard::SystemClipboard`]; tests use
/// [`crate::infrastructure::clipboard::mock::MockClipboard`].
pub trait ClipboardSource: Send + Sync {
    /// Returns the current clipboard text, trimmed.  Non-text content reads as
    /// an empty string.
    fn read_text(&self) -> Result<String, ClipboardError>;
}

/// Runs the clipboard polling loop forever.
///
/// Ticks that fall behind (because a cycle held the pipeline for longer than
/// one interval) are delayed rather than replayed in a burst.
pub async fn watch_clipboard(pipeline: Arc<DispatchPipeline>, poll_interval: Duration) {
    info!(stage = "system", "clipboard monitoring started");

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let outcome = pipeline.handle(Trigger::ClipboardWatch).await;
        if !matches!(outcome, CycleOutcome::NoChange) {
            debug!(?outcome, "clipboard poll finished");
        }
    }
}
