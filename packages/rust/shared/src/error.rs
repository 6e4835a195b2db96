//! Error types for oaspages.
//!
//! Library crates use [`OasPagesError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all oaspages operations.
#[derive(Debug, thiserror::Error)]
pub enum OasPagesError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The build bundle archive could not be opened or extracted.
    #[error("bundle error: {0}")]
    Bundle(String),

    /// The binary build metadata could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An external command failed to start or exited unsuccessfully.
    #[error("command `{command}` failed: {message}")]
    Command { command: String, message: String },

    /// Tool cache index or blob error.
    #[error("cache error: {0}")]
    Cache(String),

    /// A page declares a spec source this tool cannot render.
    #[error("unsupported source type \"{source_type}\" for {slug}")]
    UnsupportedSource { source_type: String, slug: String },

    /// Data validation error (bad slug, bad URL, bad cache key, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OasPagesError>;

impl OasPagesError {
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

    /// Create a command error for `command`.
    pub fn command(command: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: msg.into(),
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
