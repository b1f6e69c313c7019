//! Shared types, error model, and configuration for pressrun.
//!
//! This crate is the foundation depended on by all other pressrun crates.
//! It provides:
//! - [`PressrunError`] / [`ToolError`] — the unified error types
//! - Domain types ([`Stem`], [`SourceKind`], [`PublishStage`])
//! - Configuration ([`PressrunConfig`], [`PublishPaths`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, PathsConfig, PressrunConfig, PublishPaths, SiteConfig, ToolsConfig,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{PressrunError, Result, ToolError};
pub use types::{PublishStage, STEM_DATE_FORMAT, SourceKind, Stem};
