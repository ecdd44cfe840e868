//! TextBoxGPT agent entry point.
//!
//! Wires the decrypted configuration, the completion client, the keystroke
//! driver and the global hotkeys into one [`DispatchPipeline`], then runs the
//! clipboard watcher and the hotkey dispatch loop until the exit hotkey (or
//! Ctrl-C) ends the process.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ logging::init()              -- console + daily file
//!  └─ storage::config::load()      -- gpt.key + gpt_config.bin next to the exe
//!  └─ platform_driver().init()     -- SendInput on Windows
//!  └─ DispatchPipeline::start()
//!  └─ platform_hotkeys().start()   -- Ctrl+D / Ctrl+T / Alt+Q
//!  └─ spawn(watch_clipboard)       -- 500 ms poll for "GPT…" text
//!  └─ hotkey dispatch loop
//!       ├─ SendClipboard / ReplayLast -> spawn(pipeline.handle)
//!       └─ Exit                       -> process::exit(0)
//! ```
//!
//! Startup failures (missing or undecryptable credentials, driver or hotkey
//! registration failure) are fatal: the agent logs the diagnostic and exits
//! with a non-zero status before any trigger is armed.
//!
//! Exit goes through `process::exit` rather than returning from `main`: an
//! injection in progress runs on the blocking pool and the runtime would
//! otherwise wait for it to finish typing.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use textbox_agent::application::dispatch::{CycleOutcome, DispatchPipeline, Trigger};
use textbox_agent::application::inject_text::TextInjector;
use textbox_agent::application::watch_clipboard::{watch_clipboard, POLL_INTERVAL};
use textbox_agent::infrastructure::{
    clipboard::SystemClipboard,
    completion::OpenAiClient,
    hotkeys::{platform_hotkeys, HotkeyAction},
    keystroke::platform_driver,
    logging,
    storage::config as config_store,
    transfer::TransferFile,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let working_dir = std::env::current_dir().context("failed to resolve working directory")?;
    logging::init(&working_dir).context("failed to initialise logging")?;

    info!(stage = "system", "TextBoxGPT starting");

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = match config_store::load() {
        Ok(config) => config,
        Err(e) => {
            error!(stage = "system", "failed to load configuration: {e}");
            return Err(e).context("cannot start without a valid configuration");
        }
    };
    info!(stage = "system", "API URL: {}", config.api_url());
    info!(stage = "system", "Model: {}", config.model_name());

    // ── Keystroke driver ──────────────────────────────────────────────────────
    let driver = platform_driver();
    if let Err(e) = driver.init() {
        error!(stage = "system", "failed to initialise keystroke driver: {e}");
        return Err(e).context("keystroke driver unavailable");
    }

    // ── Pipeline ──────────────────────────────────────────────────────────────
    let completion =
        Arc::new(OpenAiClient::from_config(&config).context("failed to build completion client")?);
    let transfer = Arc::new(TransferFile::in_working_dir());
    let injector = Arc::new(TextInjector::new(driver, Arc::clone(&transfer) as _));
    let pipeline = Arc::new(DispatchPipeline::new(
        Arc::new(SystemClipboard::new()),
        completion,
        transfer,
        injector,
    ));
    pipeline.start();

    // ── Hotkeys ───────────────────────────────────────────────────────────────
    let hotkeys = platform_hotkeys();
    let mut actions = match hotkeys.start() {
        Ok(rx) => rx,
        Err(e) => {
            error!(stage = "system", "failed to register hotkeys: {e}");
            return Err(e).context("global hotkeys unavailable");
        }
    };

    // ── Clipboard watcher ─────────────────────────────────────────────────────
    tokio::spawn(watch_clipboard(Arc::clone(&pipeline), POLL_INTERVAL));

    println!("Script is running:");
    println!("- Press Ctrl+D to send clipboard content to the model");
    println!("- Press Ctrl+T to type the last response from output.txt");
    println!("- Press Alt+Q to exit");
    println!("- Prefix clipboard text with 'GPT' for automatic processing");

    // ── Hotkey dispatch loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            action = actions.recv() => {
                let Some(action) = action else {
                    warn!(stage = "system", "hotkey listener stopped");
                    break;
                };
                let trigger = match action {
                    HotkeyAction::SendClipboard => Trigger::SendClipboard,
                    HotkeyAction::ReplayLast => Trigger::ReplayLast,
                    HotkeyAction::Exit => {
                        pipeline.handle(Trigger::Exit).await;
                        std::process::exit(0);
                    }
                };
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move {
                    if let CycleOutcome::Completed { chars } = pipeline.handle(trigger).await {
                        info!(stage = "system", chars, "{trigger:?} finished");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!(stage = "system", "shutdown signal received");
                std::process::exit(0);
            }
        }
    }

    Ok(())
}
