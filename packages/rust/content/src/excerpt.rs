//! Brief excerpting: link stripping and fixed-length truncation.
//!
//! The brief for a document is the first 400 characters of its
//! link-stripped body, terminated by a literal `...`.

use std::sync::LazyLock;

use regex::Regex;

/// Number of characters of stripped body a brief keeps.
pub const EXCERPT_CHARS: usize = 400;

/// Marker appended to every brief.
pub const EXCERPT_SUFFIX: &str = "...";

/// Remove hyperlink markup `[label](target)`, keeping just the label.
///
/// Non-greedy on both sides, and `.` does not cross line breaks, so a
/// stray `[` on one line cannot swallow a link on the next.
pub fn strip_links(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("valid regex"));

    LINK_RE.replace_all(text, "$1").to_string()
}

/// Produce the brief body for a document: strip links, keep the first
/// [`EXCERPT_CHARS`] characters, append [`EXCERPT_SUFFIX`].
///
/// Truncation counts characters, not bytes, so multi-byte text is never
/// split mid-character.
pub fn excerpt(text: &str) -> String {
    let stripped = strip_links(text);
    let mut out: String = stripped.chars().take(EXCERPT_CHARS).collect();
    out.push_str(EXCERPT_SUFFIX);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_links_keeps_label() {
        let input = "See [the docs](https://example.com/docs) for details.";
        assert_eq!(strip_links(input), "See the docs for details.");
    }

    #[test]
    fn strip_links_multiple_on_one_line() {
        let input = "[a](x) and [b](y)";
        assert_eq!(strip_links(input), "a and b");
    }

    #[test]
    fn strip_links_image_syntax_loses_brackets() {
        // The leading `!` survives; only the bracket/paren structure goes.
        let input = "before ![figure one](media/fig.png) after";
        assert_eq!(strip_links(input), "before !figure one after");
    }

    #[test]
    fn strip_links_does_not_cross_lines() {
        let input = "a [dangling\nbracket](target)";
        assert_eq!(strip_links(input), input);
    }

    #[test]
    fn excerpt_empty_document() {
        assert_eq!(excerpt(""), "...");
    }

    #[test]
    fn excerpt_short_document_kept_whole() {
        let input = "# Hello\nA short note.";
        assert_eq!(excerpt(input), "# Hello\nA short note....");
    }

    #[test]
    fn excerpt_truncates_to_bound() {
        let input = "x".repeat(1000);
        let result = excerpt(&input);
        assert_eq!(result.chars().count(), EXCERPT_CHARS + EXCERPT_SUFFIX.len());
        assert!(result.ends_with(EXCERPT_SUFFIX));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let input = "日".repeat(500);
        let result = excerpt(&input);
        assert_eq!(result.chars().count(), EXCERPT_CHARS + EXCERPT_SUFFIX.len());
        assert!(result.starts_with('日'));
        assert!(result.ends_with(EXCERPT_SUFFIX));
    }

    #[test]
    fn excerpt_strips_links_before_measuring() {
        // 390 plain chars + a link whose label pushes the stripped body
        // just past the boundary: the target must never appear.
        let body = "y".repeat(390);
        let input = format!("{body} [eleven chars](https://example.com/a-very-long-target)");
        let result = excerpt(&input);
        assert!(!result.contains("example.com"));
        assert!(!result.contains(']'));
        assert_eq!(result.chars().count(), EXCERPT_CHARS + EXCERPT_SUFFIX.len());
    }

    #[test]
    fn excerpt_idempotent_once_long_enough() {
        let input = format!("# Title\n{}", "long body ".repeat(100));
        let once = excerpt(&input);
        let twice = excerpt(&once);
        assert_eq!(once, twice);
    }
}
