//! Windows keystroke injection via the SendInput API.
//!
//! Characters are typed through the active keyboard layout: `VkKeyScanW`
//! resolves each character to a virtual key, which is pressed and released
//! with `SendInput`.  Going through the layout (instead of sending Unicode
//! packets for everything) is what lets a Shift held by the injector turn
//! `h` into `H` in the focused application.
//!
//! Characters the layout cannot produce without Ctrl/Alt (AltGr symbols,
//! CJK, emoji) fall back to `KEYEVENTF_UNICODE` packets.  Unicode packets
//! ignore the Shift state, so while Shift is held the fallback sends the
//! uppercase form itself.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicBool, Ordering};

use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardLayout, SendInput, VkKeyScanW, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, VIRTUAL_KEY,
};

use textbox_core::VK_SHIFT;

use super::{DriverError, KeystrokeDriver};

/// `VkKeyScanW` shift-state bits that need Ctrl or Alt.
const CTRL_OR_ALT: u16 = 0b0110;
/// `VkKeyScanW` shift-state bit for Shift.
const SHIFT_BIT: u16 = 0b0001;

/// Windows implementation of [`KeystrokeDriver`] using SendInput.
pub struct SendInputDriver {
    /// Whether Shift is currently held down through [`KeystrokeDriver::key_down`].
    shift_held: AtomicBool,
}

impl SendInputDriver {
    pub fn new() -> Self {
        Self {
            shift_held: AtomicBool::new(false),
        }
    }
}

impl Default for SendInputDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeystrokeDriver for SendInputDriver {
    fn init(&self) -> Result<(), DriverError> {
        // SAFETY: GetKeyboardLayout only reads the calling thread's input locale.
        let layout = unsafe { GetKeyboardLayout(0) };
        if layout.is_invalid() {
            return Err(DriverError::Init(
                "no active keyboard layout; is an interactive desktop attached?".to_string(),
            ));
        }
        Ok(())
    }

    fn key_down(&self, vk: u16) -> Result<(), DriverError> {
        send(&[vk_input(vk, false)])?;
        if vk == VK_SHIFT {
            self.shift_held.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn key_up(&self, vk: u16) -> Result<(), DriverError> {
        send(&[vk_input(vk, true)])?;
        if vk == VK_SHIFT {
            self.shift_held.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn input_char(&self, ch: char) -> Result<(), DriverError> {
        let shift_held = self.shift_held.load(Ordering::SeqCst);

        if let Some((vk, needs_shift)) = layout_key_for(ch) {
            let wrap_shift = needs_shift && !shift_held;
            let mut inputs = Vec::with_capacity(4);
            if wrap_shift {
                inputs.push(vk_input(VK_SHIFT, false));
            }
            inputs.push(vk_input(vk, false));
            inputs.push(vk_input(vk, true));
            if wrap_shift {
                inputs.push(vk_input(VK_SHIFT, true));
            }
            return send(&inputs);
        }

        let ch = if shift_held {
            single_uppercase(ch).unwrap_or(ch)
        } else {
            ch
        };
        let mut units = [0u16; 2];
        let inputs: Vec<INPUT> = ch
            .encode_utf16(&mut units)
            .iter()
            .flat_map(|&unit| [unicode_input(unit, false), unicode_input(unit, true)])
            .collect();
        send(&inputs)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Resolves `ch` to `(virtual key, needs Shift)` on the active layout, or
/// `None` when the layout cannot type it with at most Shift.
fn layout_key_for(ch: char) -> Option<(u16, bool)> {
    let mut units = [0u16; 2];
    let encoded = ch.encode_utf16(&mut units);
    if encoded.len() != 1 {
        return None;
    }

    // SAFETY: VkKeyScanW is a pure lookup on the calling thread's layout.
    let scan = unsafe { VkKeyScanW(encoded[0]) };
    if scan == -1 {
        return None;
    }
    decode_vk_scan(scan)
}

/// Splits a `VkKeyScanW` result into `(virtual key, needs Shift)`.
fn decode_vk_scan(scan: i16) -> Option<(u16, bool)> {
    let raw = scan as u16;
    let vk = raw & 0x00FF;
    let modifiers = (raw >> 8) & 0x00FF;
    if modifiers & CTRL_OR_ALT != 0 {
        return None;
    }
    Some((vk, modifiers & SHIFT_BIT != 0))
}

fn single_uppercase(ch: char) -> Option<char> {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => Some(u),
        _ => None,
    }
}

fn vk_input(vk: u16, key_up: bool) -> INPUT {
    keyboard_input(VIRTUAL_KEY(vk), 0, if key_up { KEYEVENTF_KEYUP } else { KEYBD_EVENT_FLAGS(0) })
}

fn unicode_input(unit: u16, key_up: bool) -> INPUT {
    let mut flags = KEYEVENTF_UNICODE;
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    keyboard_input(VIRTUAL_KEY(0), unit, flags)
}

fn keyboard_input(vk: VIRTUAL_KEY, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> Result<(), DriverError> {
    // SAFETY: every element is a fully initialised KEYBDINPUT structure.
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(DriverError::Platform(format!(
            "SendInput accepted {sent} of {} events (input blocked by a higher-integrity window?)",
            inputs.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_vk_scan_plain_letter() {
        // 'a' on a US layout: VK 0x41, no modifiers.
        assert_eq!(decode_vk_scan(0x0041), Some((0x41, false)));
    }

    #[test]
    fn test_decode_vk_scan_shifted_symbol() {
        // '!' on a US layout: VK '1' with Shift.
        assert_eq!(decode_vk_scan(0x0131), Some((0x31, true)));
    }

    #[test]
    fn test_decode_vk_scan_altgr_symbol_is_rejected() {
        // Ctrl+Alt (AltGr) combinations go through the Unicode fallback.
        assert_eq!(decode_vk_scan(0x0651), None);
    }

    #[test]
    fn test_single_uppercase_handles_multi_char_expansion() {
        assert_eq!(single_uppercase('ä'), Some('Ä'));
        assert_eq!(single_uppercase('ß'), None);
    }
}
