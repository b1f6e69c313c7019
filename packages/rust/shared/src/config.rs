//! Application configuration for pressrun.
//!
//! Config lives at `./pressrun.toml` in the blog repository root, the
//! directory the tool is run from. CLI flags override config file values,
//! which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PressrunError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "pressrun.toml";

// ---------------------------------------------------------------------------
// Config structs (matching pressrun.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PressrunConfig {
    /// Site identity, used by the feed.
    #[serde(default)]
    pub site: SiteConfig,

    /// Directory layout of the blog repository.
    #[serde(default)]
    pub paths: PathsConfig,

    /// External tool programs and limits.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    #[serde(default = "default_site_title")]
    pub title: String,

    /// One-line subtitle, used as the feed description.
    #[serde(default = "default_site_subtitle")]
    pub subtitle: String,

    /// Author display name.
    #[serde(default = "default_author")]
    pub author: String,

    /// Author contact email (feed managing editor).
    #[serde(default = "default_email")]
    pub email: String,

    /// Public base URL of the site, no trailing slash.
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Feed language code.
    #[serde(default = "default_language")]
    pub language: String,

    /// IANA timezone name publication dates are localized to.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            subtitle: default_site_subtitle(),
            author: default_author(),
            email: default_email(),
            url: default_site_url(),
            language: default_language(),
            timezone: default_timezone(),
        }
    }
}

fn default_site_title() -> String {
    "My Blog".into()
}
fn default_site_subtitle() -> String {
    "Notes and articles".into()
}
fn default_author() -> String {
    "Author".into()
}
fn default_email() -> String {
    "author@example.com".into()
}
fn default_site_url() -> String {
    "https://example.com".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_timezone() -> String {
    "UTC".into()
}

impl SiteConfig {
    /// Resolve the configured timezone name to a [`chrono_tz::Tz`].
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        chrono_tz::Tz::from_str(&self.timezone).map_err(|_| {
            PressrunError::config(format!("unknown timezone {:?}", self.timezone))
        })
    }
}

/// `[paths]` section. All paths are relative to the working directory
/// unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Authored source documents (`.md` / `.ipynb`).
    #[serde(default = "default_sources")]
    pub sources: String,

    /// Published article files.
    #[serde(default = "default_articles")]
    pub articles: String,

    /// Published brief (preview) files.
    #[serde(default = "default_briefs")]
    pub briefs: String,

    /// Canonical published media directory.
    #[serde(default = "default_media")]
    pub media: String,

    /// Raw-media staging area for hand-placed figures.
    #[serde(default = "default_raw_media")]
    pub raw_media: String,

    /// Static files directory (feed output lands here).
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Root under which per-run temporary workspaces are created.
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// URL prefix image references are rewritten to. Must end with `/`.
    #[serde(default = "default_media_url_prefix")]
    pub media_url_prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            articles: default_articles(),
            briefs: default_briefs(),
            media: default_media(),
            raw_media: default_raw_media(),
            static_dir: default_static_dir(),
            workspace: default_workspace(),
            media_url_prefix: default_media_url_prefix(),
        }
    }
}

fn default_sources() -> String {
    "drafts".into()
}
fn default_articles() -> String {
    "web/articles".into()
}
fn default_briefs() -> String {
    "web/briefs".into()
}
fn default_media() -> String {
    "web/media".into()
}
fn default_raw_media() -> String {
    "media".into()
}
fn default_static_dir() -> String {
    "web/static".into()
}
fn default_workspace() -> String {
    "tmp".into()
}
fn default_media_url_prefix() -> String {
    "/media/".into()
}

/// `[tools]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Notebook converter program (invoked as `<program> nbconvert ...`).
    #[serde(default = "default_converter")]
    pub converter: String,

    /// Formula rasterizer program (invoked with formula text and output path).
    #[serde(default = "default_rasterizer")]
    pub rasterizer: String,

    /// Scratch directory the rasterizer writes into before images are moved
    /// to the media directory. Defaults to the system temp directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<String>,

    /// Hard deadline for any single external tool invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            converter: default_converter(),
            rasterizer: default_rasterizer(),
            scratch_dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_converter() -> String {
    "jupyter".into()
}
fn default_rasterizer() -> String {
    "l2p".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl ToolsConfig {
    /// Resolve the scratch directory, falling back to the system temp dir.
    pub fn scratch_dir(&self) -> PathBuf {
        match &self.scratch_dir {
            Some(dir) => PathBuf::from(dir),
            None => std::env::temp_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Publish paths (runtime, resolved from config)
// ---------------------------------------------------------------------------

/// Resolved directory layout handed to the publish pipeline.
#[derive(Debug, Clone)]
pub struct PublishPaths {
    /// Authored source documents.
    pub sources: PathBuf,
    /// Published article files.
    pub articles: PathBuf,
    /// Published brief files.
    pub briefs: PathBuf,
    /// Canonical published media directory.
    pub media: PathBuf,
    /// Raw-media staging area for hand-placed figures.
    pub raw_media: PathBuf,
    /// Root for per-run temporary workspaces.
    pub workspace: PathBuf,
    /// URL prefix image references are rewritten to.
    pub media_url_prefix: String,
}

impl From<&PressrunConfig> for PublishPaths {
    fn from(config: &PressrunConfig) -> Self {
        Self {
            sources: PathBuf::from(&config.paths.sources),
            articles: PathBuf::from(&config.paths.articles),
            briefs: PathBuf::from(&config.paths.briefs),
            media: PathBuf::from(&config.paths.media),
            raw_media: PathBuf::from(&config.paths.raw_media),
            workspace: PathBuf::from(&config.paths.workspace),
            media_url_prefix: config.paths.media_url_prefix.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config from an explicit path, or `./pressrun.toml`.
/// A missing default file yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<PressrunConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => {
            let path = Path::new(CONFIG_FILE_NAME);
            if !path.exists() {
                tracing::debug!(?path, "config file not found, using defaults");
                return Ok(PressrunConfig::default());
            }
            load_config_from(path)
        }
    }
}

/// Load the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<PressrunConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PressrunError::io(path, e))?;

    let config: PressrunConfig = toml::from_str(&content).map_err(|e| {
        PressrunError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Write a starter config file. Refuses to overwrite unless `force`.
/// Returns the path to the created file.
pub fn init_config(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(PressrunError::config(format!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        )));
    }

    let config = PressrunConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PressrunError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| PressrunError::io(path, e))?;
    tracing::info!(?path, "created starter config file");

    Ok(path.to_path_buf())
}

/// Check config values the pipeline and feed rely on.
pub fn validate_config(config: &PressrunConfig) -> Result<()> {
    url::Url::parse(&config.site.url)
        .map_err(|e| PressrunError::config(format!("site.url {:?}: {e}", config.site.url)))?;

    config.site.tz()?;

    if config.tools.timeout_secs == 0 {
        return Err(PressrunError::config("tools.timeout_secs must be positive"));
    }

    if !config.paths.media_url_prefix.ends_with('/') {
        return Err(PressrunError::config(format!(
            "paths.media_url_prefix {:?} must end with '/'",
            config.paths.media_url_prefix
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = PressrunConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("media_url_prefix"));
        assert!(toml_str.contains("timeout_secs"));
    }

    #[test]
    fn config_roundtrip() {
        let config = PressrunConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: PressrunConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.tools.timeout_secs, 120);
        assert_eq!(parsed.paths.media_url_prefix, "/media/");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[site]
title = "Field Notes"
url = "https://notes.example.org"
timezone = "America/Toronto"

[tools]
rasterizer = "tex2png"
"#;
        let config: PressrunConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.title, "Field Notes");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.tools.rasterizer, "tex2png");
        assert_eq!(config.tools.converter, "jupyter");
        assert_eq!(config.paths.articles, "web/articles");
        validate_config(&config).expect("valid");
    }

    #[test]
    fn publish_paths_from_config() {
        let config = PressrunConfig::default();
        let paths = PublishPaths::from(&config);
        assert_eq!(paths.articles, PathBuf::from("web/articles"));
        assert_eq!(paths.raw_media, PathBuf::from("media"));
        assert_eq!(paths.media_url_prefix, "/media/");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = PressrunConfig::default();
        config.site.url = "not a url".into();
        assert!(validate_config(&config).is_err());

        let mut config = PressrunConfig::default();
        config.site.timezone = "Mars/Olympus".into();
        assert!(validate_config(&config).is_err());

        let mut config = PressrunConfig::default();
        config.paths.media_url_prefix = "/media".into();
        assert!(validate_config(&config).is_err());

        let mut config = PressrunConfig::default();
        config.tools.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn scratch_dir_falls_back_to_temp() {
        let tools = ToolsConfig::default();
        assert_eq!(tools.scratch_dir(), std::env::temp_dir());

        let tools = ToolsConfig {
            scratch_dir: Some("/var/scratch".into()),
            ..ToolsConfig::default()
        };
        assert_eq!(tools.scratch_dir(), PathBuf::from("/var/scratch"));
    }

    #[test]
    fn init_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);

        let written = init_config(&path, false).expect("init");
        assert_eq!(written, path);

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.paths.sources, "drafts");
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "# hand-edited\n").expect("seed");

        let err = init_config(&path, false).expect_err("existing file");
        assert!(err.to_string().contains("already exists"));

        init_config(&path, true).expect("forced init");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("[site]"));
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "site = not toml at all [").expect("seed");

        let err = load_config_from(&path).expect_err("parse failure");
        assert!(matches!(err, PressrunError::Config { .. }));
    }

    #[test]
    fn load_from_missing_explicit_path_is_an_error() {
        assert!(load_config_from(Path::new("/nonexistent/pressrun.toml")).is_err());
    }
}
