//! Core domain types for the publishing pipeline.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PressrunError, Result};

/// Date format used for stem-encoded publication dates (`2024-03-05`).
pub const STEM_DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Stem
// ---------------------------------------------------------------------------

/// The identity of a published document: its source filename without
/// extension. Stems name every artifact a document produces
/// (`articles/<stem>.html`, `briefs/<stem>.md`, `media/<stem>_*.png`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stem(String);

impl Stem {
    /// The stem as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The converter's exported-figures folder name for this stem.
    pub fn figures_dirname(&self) -> String {
        format!("{}_files", self.0)
    }

    /// The formula image filename for the zero-based occurrence `index`.
    pub fn formula_image(&self, index: usize) -> String {
        format!("{}_latex_{index:02}.png", self.0)
    }

    /// The publication date encoded in the stem, if it is date-shaped.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, STEM_DATE_FORMAT).ok()
    }

    /// Derive the stem from a source path's file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                PressrunError::validation(format!("no usable file stem in {}", path.display()))
            })?;
        stem.parse()
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Stem {
    type Err = PressrunError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PressrunError::validation("stem must not be empty"));
        }
        if s.contains(['/', '\\']) || s.contains(char::is_whitespace) {
            return Err(PressrunError::validation(format!(
                "stem {s:?} must not contain path separators or whitespace"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// What kind of source document a stem was published from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Plain Markdown, copied verbatim into the articles directory.
    Plain,
    /// Computational notebook, rendered by the external converter.
    Notebook,
}

impl SourceKind {
    /// Map a source file extension to its kind. `None` for anything the
    /// pipeline does not publish.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" => Some(Self::Plain),
            "ipynb" => Some(Self::Notebook),
            _ => None,
        }
    }

    /// Detect the kind from a source path, rejecting unsupported files.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                PressrunError::validation(format!(
                    "unsupported source type: {} (expected .md or .ipynb)",
                    path.display()
                ))
            })
    }

    /// The article file extension this kind publishes.
    pub fn article_extension(&self) -> &'static str {
        match self {
            Self::Plain => "md",
            Self::Notebook => "html",
        }
    }

    /// Stable lowercase name for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Notebook => "notebook",
        }
    }
}

// ---------------------------------------------------------------------------
// PublishStage
// ---------------------------------------------------------------------------

/// Checkpoints a stem passes through on its way to being published, in
/// order. A stem is Done only after every stage before it succeeded; any
/// stage error fails the stem and skips the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    /// Plain source copied into the articles directory.
    Copied,
    /// Notebook rendered to article and intermediate Markdown.
    Converted,
    /// Brief written from the excerpted document body.
    Excerpted,
    /// Media references rewritten and figures copied into place.
    MediaRelocated,
    /// Formula markers replaced by rasterized images.
    FormulaRasterized,
    /// All stages complete.
    Done,
}

impl PublishStage {
    /// Stable lowercase name for logs and progress output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Converted => "converted",
            Self::Excerpted => "excerpted",
            Self::MediaRelocated => "media-relocated",
            Self::FormulaRasterized => "formula-rasterized",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_roundtrip() {
        let stem: Stem = "2024-03-05".parse().expect("parse stem");
        assert_eq!(stem.to_string(), "2024-03-05");
        assert_eq!(stem.figures_dirname(), "2024-03-05_files");
        assert_eq!(stem.formula_image(0), "2024-03-05_latex_00.png");
        assert_eq!(stem.formula_image(12), "2024-03-05_latex_12.png");
    }

    #[test]
    fn stem_rejects_separators() {
        assert!("a/b".parse::<Stem>().is_err());
        assert!("a b".parse::<Stem>().is_err());
        assert!("".parse::<Stem>().is_err());
    }

    #[test]
    fn stem_date_parsing() {
        let stem: Stem = "2024-03-05".parse().expect("parse");
        let date = stem.date().expect("date-shaped stem");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"));

        let stem: Stem = "notes".parse().expect("parse");
        assert!(stem.date().is_none());
    }

    #[test]
    fn stem_from_path() {
        let stem = Stem::from_path(Path::new("drafts/2024-03-05.ipynb")).expect("stem");
        assert_eq!(stem.as_str(), "2024-03-05");
    }

    #[test]
    fn source_kind_detection() {
        assert_eq!(
            SourceKind::from_path(Path::new("drafts/a.md")).expect("kind"),
            SourceKind::Plain
        );
        assert_eq!(
            SourceKind::from_path(Path::new("drafts/a.ipynb")).expect("kind"),
            SourceKind::Notebook
        );
        assert!(SourceKind::from_path(Path::new("drafts/a.txt")).is_err());
        assert!(SourceKind::from_path(Path::new("drafts/noext")).is_err());
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(PublishStage::MediaRelocated.as_str(), "media-relocated");
        assert_eq!(PublishStage::Done.to_string(), "done");
    }
}
