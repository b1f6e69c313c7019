//! Feed entries parsed from published briefs.
//!
//! A brief is trusted to carry a `# ` title heading and a whole-line
//! `*emphasized*` description, both written by the publish pipeline's
//! excerpting of the authored document. A brief missing either is
//! malformed and fails the feed build; the error names the file.

use std::path::Path;

use chrono::{DateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use pressrun_shared::{PressrunError, Result, Stem};

/// One feed item, parsed from a brief file.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    /// Stem of the published document.
    pub stem: Stem,
    /// Article title, from the brief's heading line.
    pub title: String,
    /// One-line description, from the brief's emphasized line.
    pub description: String,
    /// Publication instant: the stem date at midnight, site-local.
    pub published: DateTime<Tz>,
}

impl FeedEntry {
    /// Parse a brief's text into a feed entry. `path` is only used to
    /// name the brief in errors.
    pub fn from_brief(stem: Stem, path: &Path, text: &str, tz: Tz) -> Result<Self> {
        let title = brief_title(text)
            .ok_or_else(|| PressrunError::malformed(path, "no `# ` title heading line"))?
            .to_string();
        let description = brief_description(text)
            .ok_or_else(|| {
                PressrunError::malformed(path, "no whole-line `*...*` description line")
            })?
            .to_string();

        let date = stem.date().ok_or_else(|| {
            PressrunError::validation(format!(
                "brief stem {:?} is not a %Y-%m-%d date, cannot derive a pubDate",
                stem.as_str()
            ))
        })?;
        let published = tz
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
            .ok_or_else(|| {
                PressrunError::validation(format!(
                    "midnight {} does not exist in timezone {tz}",
                    stem.as_str()
                ))
            })?;

        Ok(Self {
            stem,
            title,
            description,
            published,
        })
    }
}

/// The brief's title: the first `# ` heading line, marker stripped.
pub fn brief_title(text: &str) -> Option<&str> {
    text.lines()
        .find_map(|line| line.trim_end().strip_prefix("# "))
}

/// The brief's description: the first whole-line `*...*` emphasis,
/// markers stripped (exactly one asterisk from each end).
pub fn brief_description(text: &str) -> Option<&str> {
    text.lines().map(str::trim_end).find_map(|line| {
        if line.len() >= 2 && line.starts_with('*') && line.ends_with('*') {
            Some(&line[1..line.len() - 1])
        } else {
            None
        }
    })
}
