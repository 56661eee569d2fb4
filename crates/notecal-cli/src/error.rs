//! CLI error types.
//!
//! Everything here aborts the run. Per-line problems never reach this
//! level; they are reported as diagnostics by the core and skipped.

use std::io;
use std::path::PathBuf;

use notecal_core::{FormatError, ReloadError, TracingError};
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input pattern matched no files.
    #[error("no input files matched `{0}`")]
    NoInput(String),

    /// The input pattern is not a valid glob.
    #[error("invalid input pattern `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A structured input file could not be reloaded.
    #[error("failed to reload {}: {source}", .path.display())]
    Reload {
        path: PathBuf,
        #[source]
        source: ReloadError,
    },

    /// Rendering failed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    /// Logging could not be set up.
    #[error(transparent)]
    Tracing(#[from] TracingError),
}

impl CliError {
    /// Wraps an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
