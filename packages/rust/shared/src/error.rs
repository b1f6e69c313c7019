//! Error types for pressrun.
//!
//! Library crates use [`PressrunError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Top-level error type for all pressrun operations.
#[derive(Debug, thiserror::Error)]
pub enum PressrunError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A source document the caller asked to publish does not exist.
    #[error("source not found: {path:?}")]
    SourceNotFound { path: PathBuf },

    /// A document is missing structure the pipeline relies on
    /// (e.g. a brief with no title heading or no description line).
    #[error("malformed document {path:?}: {what}")]
    MalformedDocument { path: PathBuf, what: String },

    /// External tool invocation failed (converter or rasterizer).
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Feed assembly error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad stem, unsupported extension, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PressrunError>;

impl PressrunError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a source-not-found error for a path.
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a malformed-document error for a path.
    pub fn malformed(path: impl Into<PathBuf>, what: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            what: what.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Errors from running an external tool.
///
/// Lives here rather than in the tools crate so that core and the CLI can
/// match on it without a dependency cycle.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program could not be spawned at all.
    #[error("failed to start `{program}`: {source}. Is `{program}` installed and on PATH?")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The program exited with a non-zero status.
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The program ran past the configured deadline and was killed.
    #[error("`{program}` timed out after {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    /// The program reported success but the expected output file is missing.
    #[error("`{program}` produced no output at {path:?}")]
    MissingOutput { program: String, path: PathBuf },

    /// I/O error while waiting on or cleaning up the child process.
    #[error("I/O error while running `{program}`: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PressrunError::config("missing site url");
        assert_eq!(err.to_string(), "config error: missing site url");

        let err = PressrunError::malformed("briefs/2024-01-01.md", "no title heading");
        assert!(err.to_string().contains("no title heading"));
    }

    #[test]
    fn tool_error_spawn_hint() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ToolError::Spawn {
            program: "jupyter".into(),
            source,
        };
        assert!(err.to_string().contains("Is `jupyter` installed"));
    }
}
