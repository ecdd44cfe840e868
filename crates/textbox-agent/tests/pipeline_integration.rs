//! Integration tests for the dispatch pipeline.
//!
//! These tests exercise the application layer of textbox-agent end-to-end:
//! `DispatchPipeline` + `TextInjector` + the clipboard watcher loop, wired to
//! the in-crate test doubles and a real transfer file in a temp directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use textbox_agent::application::dispatch::{
    CompletionClient, CompletionError, CompletionRequest, CycleOutcome, DispatchPipeline,
    PipelineState, Trigger, SYSTEM_INSTRUCTION,
};
use textbox_agent::application::inject_text::{TextInjector, GRACE_PERIOD};
use textbox_agent::application::watch_clipboard::watch_clipboard;
use textbox_agent::infrastructure::clipboard::mock::MockClipboard;
use textbox_agent::infrastructure::hotkeys::{mock::MockHotkeySource, HotkeyAction, HotkeySource};
use textbox_agent::infrastructure::keystroke::recording::{KeyEvent, RecordingDriver};
use textbox_agent::infrastructure::transfer::{TransferFile, TransferStore, TRANSFER_FILE_NAME};

/// Completion client that answers from a fixed reply and records prompts.
struct ScriptedClient {
    reply: Result<String, String>,
    prompts: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(CompletionError::Transport)
    }
}

struct Agent {
    pipeline: Arc<DispatchPipeline>,
    clipboard: Arc<MockClipboard>,
    client: Arc<ScriptedClient>,
    driver: Arc<RecordingDriver>,
    transfer: Arc<TransferFile>,
    _dir: tempfile::TempDir,
}

fn agent(client: ScriptedClient) -> Agent {
    let dir = tempfile::tempdir().unwrap();
    let clipboard = Arc::new(MockClipboard::new());
    let client = Arc::new(client);
    let driver = Arc::new(RecordingDriver::new());
    let transfer = Arc::new(TransferFile::new(dir.path().join(TRANSFER_FILE_NAME)));
    let injector = Arc::new(TextInjector::new(
        Arc::clone(&driver) as _,
        Arc::clone(&transfer) as _,
    ));
    let pipeline = Arc::new(DispatchPipeline::new(
        Arc::clone(&clipboard) as _,
        Arc::clone(&client) as _,
        Arc::clone(&transfer) as _,
        injector,
    ));
    pipeline.start();
    Agent {
        pipeline,
        clipboard,
        client,
        driver,
        transfer,
        _dir: dir,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sentinel_copy_is_answered_and_typed_after_grace_period() {
    // Arrange
    let a = agent(ScriptedClient::replying("Line one\nLine Two"));
    a.clipboard.set_text("GPT summarise this");
    let started = Instant::now();

    // Act
    let outcome = a.pipeline.handle(Trigger::ClipboardWatch).await;

    // Assert
    assert!(started.elapsed() >= GRACE_PERIOD, "typing must wait for the grace period");
    assert_eq!(a.client.prompts(), vec!["summarise this"]);
    assert_eq!(
        a.transfer.read().unwrap().as_deref(),
        Some("Line one\nLine Two")
    );
    assert_eq!(a.driver.typed_text(), "line one   line two");
    assert_eq!(outcome, CycleOutcome::Completed { chars: 19 });
    assert_eq!(a.pipeline.state(), PipelineState::AwaitingTrigger);
}

#[tokio::test]
async fn test_every_request_carries_the_fixed_system_instruction() {
    let a = agent(ScriptedClient::replying("ok"));
    a.clipboard.set_text("hello");

    a.pipeline.handle(Trigger::SendClipboard).await;

    let prompts = a.client.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].system, SYSTEM_INSTRUCTION);
    assert_eq!(prompts[0].prompt, "hello");
}

#[tokio::test]
async fn test_uppercase_characters_are_wrapped_in_shift() {
    let a = agent(ScriptedClient::replying("Hi"));
    a.clipboard.set_text("GPT greet");

    a.pipeline.handle(Trigger::ClipboardWatch).await;

    assert_eq!(
        a.driver.events(),
        vec![
            KeyEvent::KeyDown(16),
            KeyEvent::Char('h'),
            KeyEvent::KeyUp(16),
            KeyEvent::Char('i'),
        ]
    );
}

#[tokio::test]
async fn test_failed_request_leaves_previous_response_for_replay() {
    // Arrange
    let a = agent(ScriptedClient::failing("connection refused"));
    a.transfer.write("earlier answer").unwrap();
    a.clipboard.set_text("GPT new question");

    // Act
    let failed = a.pipeline.handle(Trigger::ClipboardWatch).await;
    let replayed = a.pipeline.handle(Trigger::ReplayLast).await;

    // Assert
    assert_eq!(failed, CycleOutcome::RemoteFailed);
    assert_eq!(replayed, CycleOutcome::Completed { chars: 14 });
    assert_eq!(a.driver.typed_text(), "earlier answer");
}

#[tokio::test]
async fn test_watcher_loop_dispatches_sentinel_copies_once_each() {
    // Arrange – plain text, then a sentinel prompt that stays on the clipboard
    let a = agent(ScriptedClient::replying("done"));
    a.clipboard.push_text("just some text");
    a.clipboard.push_failure("locked by another process");
    a.clipboard.push_text("GPT first");

    // Act
    let watcher = tokio::spawn(watch_clipboard(
        Arc::clone(&a.pipeline),
        Duration::from_millis(10),
    ));
    let deadline = Instant::now() + Duration::from_secs(10);
    while a.driver.typed_text().is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    // Let the loop poll the unchanged clipboard a few more times.
    let reads_before = a.clipboard.read_count();
    while a.clipboard.read_count() < reads_before + 5 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    watcher.abort();

    // Assert
    assert_eq!(a.client.prompts(), vec!["first"]);
    assert_eq!(a.driver.typed_text(), "done");
}

#[tokio::test]
async fn test_hotkey_actions_drive_the_pipeline() {
    // Arrange
    let a = agent(ScriptedClient::replying("answer"));
    a.clipboard.set_text("plain prompt");
    let hotkeys = MockHotkeySource::new();
    let mut actions = hotkeys.start().unwrap();
    let handled = Arc::new(AtomicUsize::new(0));

    // Act
    hotkeys.press(HotkeyAction::SendClipboard);
    hotkeys.press(HotkeyAction::ReplayLast);
    hotkeys.press(HotkeyAction::Exit);

    let mut outcomes = Vec::new();
    while let Some(action) = actions.recv().await {
        let trigger = match action {
            HotkeyAction::SendClipboard => Trigger::SendClipboard,
            HotkeyAction::ReplayLast => Trigger::ReplayLast,
            HotkeyAction::Exit => Trigger::Exit,
        };
        handled.fetch_add(1, Ordering::SeqCst);
        let outcome = a.pipeline.handle(trigger).await;
        outcomes.push(outcome);
        if outcome == CycleOutcome::Exit {
            break;
        }
    }

    // Assert
    assert_eq!(handled.load(Ordering::SeqCst), 3);
    assert_eq!(
        outcomes,
        vec![
            CycleOutcome::Completed { chars: 6 },
            CycleOutcome::Completed { chars: 6 },
            CycleOutcome::Exit,
        ]
    );
    assert_eq!(a.driver.typed_text(), "answeranswer");
    assert_eq!(a.client.prompts(), vec!["plain prompt"]);
}
