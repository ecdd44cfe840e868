//! Prompt extraction from clipboard text.
//!
//! The clipboard watcher only fires for text that begins with the literal
//! sentinel [`PROMPT_SENTINEL`].  Everything after the sentinel, trimmed, is
//! the prompt.

/// Literal prefix that marks clipboard text as a request.
pub const PROMPT_SENTINEL: &str = "GPT";

/// Returns the prompt carried by `clipboard`, or `None` if the text does not
/// start with the sentinel.
///
/// The sentinel match is case-sensitive and must be at the very start of the
/// text.  A match whose remainder is blank yields `Some("")`; callers treat
/// that as an empty prompt rather than as "no sentinel".
pub fn extract_sentinel_prompt(clipboard: &str) -> Option<&str> {
    clipboard.strip_prefix(PROMPT_SENTINEL).map(str::trim)
}

/// Returns `true` if `prompt` has no non-whitespace content.
pub fn is_blank(prompt: &str) -> bool {
    prompt.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_prefix_is_stripped_and_trimmed() {
        assert_eq!(extract_sentinel_prompt("GPT do X"), Some("do X"));
    }

    #[test]
    fn test_text_without_sentinel_yields_none() {
        assert_eq!(extract_sentinel_prompt("do X"), None);
    }

    #[test]
    fn test_sentinel_must_be_at_start() {
        assert_eq!(extract_sentinel_prompt("please GPT do X"), None);
    }

    #[test]
    fn test_sentinel_is_case_sensitive() {
        assert_eq!(extract_sentinel_prompt("gpt do X"), None);
    }

    #[test]
    fn test_sentinel_only_yields_empty_prompt() {
        // Arrange / Act
        let prompt = extract_sentinel_prompt("GPT   \n ");

        // Assert
        assert_eq!(prompt, Some(""));
        assert!(is_blank(prompt.unwrap()));
    }

    #[test]
    fn test_sentinel_glued_to_text_is_still_stripped() {
        assert_eq!(extract_sentinel_prompt("GPTsummarise this"), Some("summarise this"));
    }
}
