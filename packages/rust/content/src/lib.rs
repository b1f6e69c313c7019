//! Pure text transformations for the publishing pipeline.
//!
//! Everything in this crate is `&str` in, owned value out: excerpting for
//! briefs, media-reference relocation, and formula-marker scanning.
//! File I/O and external tool invocation live in `pressrun-core` and
//! `pressrun-tools`.

pub mod excerpt;
pub mod formula;
pub mod relocate;

// Re-export public API at crate root for ergonomic imports.
pub use excerpt::{EXCERPT_CHARS, EXCERPT_SUFFIX, excerpt, strip_links};
pub use formula::{FormulaMatch, scan_formulas, substitute_formulas};
pub use relocate::{relocate_figures, relocate_media_lines};
