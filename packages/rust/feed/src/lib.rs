//! RSS feed generation for pressrun.
//!
//! The feed is rebuilt from the published briefs directory: every brief
//! contributes one item, dated by its stem, and the channel is written
//! as `rss.xml` into the static files directory.

mod entry;

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use tracing::{debug, info, instrument};

use pressrun_shared::{PressrunConfig, PressrunError, Result, SiteConfig, Stem};

pub use entry::{FeedEntry, brief_description, brief_title};

/// Feed output filename inside the static directory.
pub const FEED_FILE_NAME: &str = "rss.xml";

// ---------------------------------------------------------------------------
// Entry collection
// ---------------------------------------------------------------------------

/// Parse every `.md` brief in `briefs_dir` into a feed entry.
///
/// A missing directory yields an empty feed (nothing published yet);
/// a brief that fails to parse fails the whole build, naming the file.
pub fn collect_entries(briefs_dir: &Path, tz: Tz) -> Result<Vec<FeedEntry>> {
    if !briefs_dir.exists() {
        debug!(dir = %briefs_dir.display(), "briefs directory missing, empty feed");
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    let dir = std::fs::read_dir(briefs_dir).map_err(|e| PressrunError::io(briefs_dir, e))?;
    for dir_entry in dir {
        let dir_entry = dir_entry.map_err(|e| PressrunError::io(briefs_dir, e))?;
        let path = dir_entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = Stem::from_path(&path)?;
        let text = std::fs::read_to_string(&path).map_err(|e| PressrunError::io(&path, e))?;
        entries.push(FeedEntry::from_brief(stem, &path, &text, tz)?);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Channel building
// ---------------------------------------------------------------------------

/// Build the RSS 2.0 channel for the site, items newest-first.
pub fn build_feed(site: &SiteConfig, mut entries: Vec<FeedEntry>) -> Channel {
    entries.sort_by(|a, b| b.published.cmp(&a.published));

    let author = format!("{} ({})", site.email, site.author);
    let items: Vec<Item> = entries
        .iter()
        .map(|entry| {
            let link = format!("{}/article/{}", site.url, entry.stem);
            ItemBuilder::default()
                .title(Some(entry.title.clone()))
                .link(Some(link.clone()))
                .guid(Some(
                    GuidBuilder::default()
                        .value(link.clone())
                        .permalink(true)
                        .build(),
                ))
                .author(Some(author.clone()))
                .description(Some(entry.description.clone()))
                .content(Some(format!(
                    "{}<br /><br />See full article at <a href=\"{link}\">{link}</a>",
                    entry.description
                )))
                .pub_date(Some(entry.published.to_rfc2822()))
                .build()
        })
        .collect();

    ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.url.clone())
        .description(site.subtitle.clone())
        .language(Some(site.language.clone()))
        .managing_editor(Some(author))
        .generator(Some(concat!("pressrun/", env!("CARGO_PKG_VERSION")).to_string()))
        .items(items)
        .build()
}

// ---------------------------------------------------------------------------
// Feed writing
// ---------------------------------------------------------------------------

/// Rebuild the feed from the configured briefs directory and write it as
/// `rss.xml` into the static directory. Returns the written path.
#[instrument(skip_all)]
pub fn write_feed(config: &PressrunConfig) -> Result<PathBuf> {
    let tz = config.site.tz()?;
    let entries = collect_entries(Path::new(&config.paths.briefs), tz)?;
    let channel = build_feed(&config.site, entries);

    let static_dir = Path::new(&config.paths.static_dir);
    std::fs::create_dir_all(static_dir).map_err(|e| PressrunError::io(static_dir, e))?;

    let path = static_dir.join(FEED_FILE_NAME);
    let xml = channel
        .write_to(Vec::new())
        .map_err(|e| PressrunError::Feed(e.to_string()))?;
    std::fs::write(&path, xml).map_err(|e| PressrunError::io(&path, e))?;

    info!(
        path = %path.display(),
        items = channel.items().len(),
        "feed written"
    );
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
