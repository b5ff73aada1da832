// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy-Markdown escaping for Telegram Bot API.
//!
//! Outbound CRM text is sent with `parse_mode: Markdown`, where `*`, `_`,
//! backtick and `[` carry formatting meaning and must be backslash-escaped
//! when they appear in user content.

/// Characters with special meaning in Telegram's legacy Markdown mode.
const SPECIAL_CHARS: &[char] = &['*', '_', '`', '['];

/// Escapes text for Telegram legacy Markdown parse mode.
///
/// A string without special characters passes through unchanged. Escaping
/// is not idempotent: re-applying it doubles the backslashes, so callers
/// must escape exactly once.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_noop() {
        assert_eq!(escape_markdown("hello"), "hello");
        assert_eq!(escape_markdown(""), "");
    }

    #[test]
    fn special_characters_are_prefixed() {
        assert_eq!(escape_markdown("a*b"), "a\\*b");
        assert_eq!(escape_markdown("_under_"), "\\_under\\_");
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
        assert_eq!(escape_markdown("[link"), "\\[link");
    }

    #[test]
    fn mixed_content() {
        assert_eq!(
            escape_markdown("price: 10 * 2 [USD]"),
            "price: 10 \\* 2 \\[USD]"
        );
    }

    #[test]
    fn reapplication_doubles_backslashes() {
        let once = escape_markdown("a*b");
        let twice = escape_markdown(&once);
        assert_eq!(twice, "a\\\\*b");
    }
}
