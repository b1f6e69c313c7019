//! Media reference relocation.
//!
//! Two rewrite rules move image references from authoring-time locations
//! to the canonical published URL prefix:
//!
//! - rule (a): the converter's stem-specific figures folder
//!   (`<stem>_files/`), rewritten document-wide;
//! - rule (b): the generic staging prefix (`media/`), rewritten only on
//!   lines that reference an image, and only in anchored `](media/` /
//!   `"media/` form so a second pass finds nothing left to rewrite.
//!
//! Callers read the whole document, transform, and write the whole
//! document back; nothing here touches the filesystem.

use tracing::debug;

/// Substring marking a Markdown image reference on a line.
const MD_IMAGE_MARKER: &str = "![";

/// Substring marking an HTML image reference on a line.
const HTML_IMAGE_MARKER: &str = "<img";

/// Rule (a): rewrite the stem's generated-figures folder prefix to the
/// canonical media prefix, everywhere in the document.
pub fn relocate_figures(text: &str, stem: &str, canonical_prefix: &str) -> String {
    let from = format!("{stem}_files/");
    let count = text.matches(from.as_str()).count();
    if count > 0 {
        debug!(stem, count, "rewriting generated-figure references");
    }
    text.replace(from.as_str(), canonical_prefix)
}

/// Rule (b): rewrite anchored staging-prefix references to the canonical
/// prefix, line by line, touching only lines that contain an image
/// reference. Every other line, and every line ending, is preserved
/// byte-for-byte.
pub fn relocate_media_lines(text: &str, canonical_prefix: &str) -> String {
    let md_to = format!("]({canonical_prefix}");
    let html_to = format!("\"{canonical_prefix}");

    let mut rewritten = 0usize;
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.contains(MD_IMAGE_MARKER) || line.contains(HTML_IMAGE_MARKER) {
            let replaced = line.replace("](media/", &md_to).replace("\"media/", &html_to);
            if replaced != line {
                rewritten += 1;
            }
            out.push_str(&replaced);
        } else {
            out.push_str(line);
        }
    }
    if rewritten > 0 {
        debug!(rewritten, "rewrote staged media references");
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
