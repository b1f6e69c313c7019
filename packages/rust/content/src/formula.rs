//! Formula marker scanning and substitution.
//!
//! A formula marker is a fenced literal region of the form
//! `%%latex\n$<formula>$\n`, the formula on a single line. Scanning
//! records every marker with its byte span; substitution applies one
//! replacement per marker in a single left-to-right pass, so the i-th
//! marker in document order always receives the i-th replacement even
//! when the same formula text repeats.

use std::sync::LazyLock;

use regex::Regex;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    // `.` does not cross the line break, keeping the formula on one line.
    Regex::new(r"%%latex\n\$(.+?)\$\n").expect("valid regex")
});

/// One formula marker found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaMatch {
    /// Byte span of the whole marker block in the document.
    pub span: (usize, usize),
    /// The formula text between the `$` delimiters.
    pub formula: String,
}

/// Find all formula markers, in document order.
pub fn scan_formulas(text: &str) -> Vec<FormulaMatch> {
    MARKER_RE
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).expect("whole match");
            FormulaMatch {
                span: (whole.start(), whole.end()),
                formula: caps[1].to_string(),
            }
        })
        .collect()
}

/// Apply one replacement per scanned marker, in a single pass.
///
/// `matches` must be the spans produced by [`scan_formulas`] on this same
/// `text`, paired positionally with `replacements`.
pub fn substitute_formulas(
    text: &str,
    matches: &[FormulaMatch],
    replacements: &[String],
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (m, replacement) in matches.iter().zip(replacements) {
        out.push_str(&text[cursor..m.span.0]);
        out.push_str(replacement);
        cursor = m.span.1;
    }
    out.push_str(&text[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_markers_in_order() {
        let input = "intro\n%%latex\n$E=mc^2$\nmiddle\n%%latex\n$a^2+b^2=c^2$\nend\n";
        let matches = scan_formulas(input);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].formula, "E=mc^2");
        assert_eq!(matches[1].formula, "a^2+b^2=c^2");
        assert!(matches[0].span.1 <= matches[1].span.0);
        assert_eq!(&input[matches[0].span.0..matches[0].span.1], "%%latex\n$E=mc^2$\n");
    }

    #[test]
    fn scan_ignores_plain_inline_math() {
        let input = "the usual $x^2$ inline form\n";
        assert!(scan_formulas(input).is_empty());
    }

    #[test]
    fn scan_requires_complete_marker() {
        // No closing newline after the formula line: not a marker.
        let input = "%%latex\n$E=mc^2$";
        assert!(scan_formulas(input).is_empty());
    }

    #[test]
    fn scan_keeps_formula_on_one_line() {
        let input = "%%latex\n$a\nb$\n";
        assert!(scan_formulas(input).is_empty());
    }

    #[test]
    fn identical_formulas_are_distinct_matches() {
        let input = "%%latex\n$x$\nand again\n%%latex\n$x$\n";
        let matches = scan_formulas(input);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].formula, matches[1].formula);
        assert_ne!(matches[0].span, matches[1].span);
    }

    #[test]
    fn substitute_replaces_left_to_right() {
        let input = "a\n%%latex\n$x$\nb\n%%latex\n$x$\nc\n";
        let matches = scan_formulas(input);
        let replacements = vec!["<first>".to_string(), "<second>".to_string()];
        let result = substitute_formulas(input, &matches, &replacements);
        assert_eq!(result, "a\n<first>b\n<second>c\n");
    }

    #[test]
    fn substitute_with_no_matches_is_identity() {
        let input = "nothing to do here\n";
        let result = substitute_formulas(input, &[], &[]);
        assert_eq!(result, input);
    }
}
