//! Keystroke planning for the text injector.
//!
//! Translates a response string into the exact sequence of driver calls the
//! injector performs.  Keeping this pure means the case and newline rules can
//! be tested without touching a real keyboard.
//!
//! # Rules
//!
//! 1. Every newline (`"\n"`, `"\r\n"`, or a lone `"\r"`) becomes
//!    [`NEWLINE_REPLACEMENT`] (three spaces).  The driver has no newline
//!    semantics.
//! 2. An uppercase character `C` becomes `KeyDown(VK_SHIFT)`, the lowercase
//!    form of `C`, then `KeyUp(VK_SHIFT)`.  The literal uppercase character is
//!    never sent.
//! 3. Every other character is sent as-is.

/// Windows virtual key code of the Shift key.
pub const VK_SHIFT: u16 = 16;

/// Text substituted for each newline before injection.
pub const NEWLINE_REPLACEMENT: &str = "   ";

/// One driver call in an injection plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Press and hold a virtual key.
    KeyDown(u16),
    /// Release a virtual key.
    KeyUp(u16),
    /// Inject a single character through the active keyboard layout.
    Char(char),
}

/// Replaces every newline sequence with [`NEWLINE_REPLACEMENT`].
pub fn replace_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str(NEWLINE_REPLACEMENT);
            }
            '\n' => out.push_str(NEWLINE_REPLACEMENT),
            other => out.push(other),
        }
    }
    out
}

/// Builds the full driver call sequence for `text`.
pub fn plan_keystrokes(text: &str) -> Vec<KeyAction> {
    let text = replace_newlines(text);
    let mut plan = Vec::with_capacity(text.len());

    for ch in text.chars() {
        if ch.is_uppercase() {
            plan.push(KeyAction::KeyDown(VK_SHIFT));
            plan.extend(ch.to_lowercase().map(KeyAction::Char));
            plan.push(KeyAction::KeyUp(VK_SHIFT));
        } else {
            plan.push(KeyAction::Char(ch));
        }
    }
    plan
}

/// Number of characters a plan injects (shift presses excluded).
pub fn injected_char_count(plan: &[KeyAction]) -> usize {
    plan.iter()
        .filter(|a| matches!(a, KeyAction::Char(_)))
        .count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
