//! Windows global hotkeys via `RegisterHotKey`.
//!
//! Hotkeys registered without a window handle post `WM_HOTKEY` to the
//! registering thread's message queue, so registration and the message loop
//! must live on the same dedicated thread.  The thread reports the outcome of
//! registration back to [`RegisteredHotkeys::start`] before entering the loop,
//! which keeps "another program already owns Ctrl+D" a startup error rather
//! than a silent no-op.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::thread;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
    MOD_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{GetMessageW, MSG, WM_HOTKEY};

use super::{HotkeyAction, HotkeyBinding, HotkeyError, HotkeySource};

/// Global hotkeys registered with the OS.
pub struct RegisteredHotkeys {
    bindings: Vec<HotkeyBinding>,
    started: AtomicBool,
}

impl RegisteredHotkeys {
    /// Creates an (unstarted) source for `bindings`.
    pub fn new(bindings: Vec<HotkeyBinding>) -> Self {
        Self {
            bindings,
            started: AtomicBool::new(false),
        }
    }
}

impl HotkeySource for RegisteredHotkeys {
    fn start(&self) -> Result<UnboundedReceiver<HotkeyAction>, HotkeyError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let bindings = self.bindings.clone();

        thread::Builder::new()
            .name("textbox-hotkeys".to_string())
            .spawn(move || run_hotkey_message_loop(bindings, tx, ready_tx))
            .map_err(|e| HotkeyError::Listener(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| HotkeyError::Listener("thread exited before registering".to_string()))??;

        Ok(rx)
    }
}

/// Entry point for the dedicated hotkey message-loop thread.
fn run_hotkey_message_loop(
    bindings: Vec<HotkeyBinding>,
    tx: UnboundedSender<HotkeyAction>,
    ready: std_mpsc::Sender<Result<(), HotkeyError>>,
) {
    let mut registered: Vec<i32> = Vec::with_capacity(bindings.len());

    for (index, binding) in bindings.iter().enumerate() {
        let id = hotkey_id(index);
        // SAFETY: a null window handle associates the hotkey with this thread's queue.
        let result =
            unsafe { RegisterHotKey(None, id, modifier_flags(binding), binding.key as u32) };
        if let Err(e) = result {
            unregister_all(&registered);
            let _ = ready.send(Err(HotkeyError::RegistrationFailed {
                binding: binding.describe(),
                reason: e.to_string(),
            }));
            return;
        }
        info!(stage = "system", "registered hotkey {}", binding.describe());
        registered.push(id);
    }

    if ready.send(Ok(())).is_err() {
        unregister_all(&registered);
        return;
    }

    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage loop on the thread that owns the hotkeys.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            if msg.message != WM_HOTKEY {
                continue;
            }
            let Some(binding) = binding_for_id(&bindings, msg.wParam.0 as i32) else {
                warn!("WM_HOTKEY with unknown id {}", msg.wParam.0);
                continue;
            };
            debug!("hotkey {} pressed", binding.describe());
            if tx.send(binding.action).is_err() {
                // Receiver dropped: the agent is shutting down.
                break;
            }
        }
    }

    unregister_all(&registered);
}

fn hotkey_id(index: usize) -> i32 {
    index as i32 + 1
}

fn binding_for_id(bindings: &[HotkeyBinding], id: i32) -> Option<&HotkeyBinding> {
    let index = usize::try_from(id.checked_sub(1)?).ok()?;
    bindings.get(index)
}

fn modifier_flags(binding: &HotkeyBinding) -> HOT_KEY_MODIFIERS {
    let mut flags = MOD_NOREPEAT;
    if binding.modifiers.ctrl {
        flags |= MOD_CONTROL;
    }
    if binding.modifiers.alt {
        flags |= MOD_ALT;
    }
    if binding.modifiers.shift {
        flags |= MOD_SHIFT;
    }
    flags
}

fn unregister_all(ids: &[i32]) {
    for &id in ids {
        // SAFETY: only ids registered on this thread are passed in.
        unsafe {
            UnregisterHotKey(None, id).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hotkeys::DEFAULT_BINDINGS;

    #[test]
    fn test_hotkey_ids_round_trip_to_bindings() {
        for (index, binding) in DEFAULT_BINDINGS.iter().enumerate() {
            assert_eq!(binding_for_id(&DEFAULT_BINDINGS, hotkey_id(index)), Some(binding));
        }
    }

    #[test]
    fn test_unknown_hotkey_ids_are_ignored() {
        assert_eq!(binding_for_id(&DEFAULT_BINDINGS, 0), None);
        assert_eq!(binding_for_id(&DEFAULT_BINDINGS, 99), None);
    }

    #[test]
    fn test_modifier_flags_always_suppress_autorepeat() {
        let flags = modifier_flags(&DEFAULT_BINDINGS[0]);
        assert_eq!(flags, MOD_NOREPEAT | MOD_CONTROL);
    }
}
