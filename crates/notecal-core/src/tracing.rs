//! Tracing setup for notecal.
//!
//! All log output goes to stderr; stdout is reserved for rendered events.
//! `RUST_LOG` overrides the level picked by the preset.
//!
//! # Usage
//!
//! ```ignore
//! use notecal_core::tracing::{init_tracing, TracingConfig, TracingOutputFormat};
//!
//! let config = if debug { TracingConfig::cli_debug() } else { TracingConfig::cli() };
//! init_tracing(config.with_format(TracingOutputFormat::Json))?;
//! ```

use std::fmt as std_fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// How diagnostics are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One line per record, no timestamp.
    #[default]
    Compact,
    /// Multi-line records for reading by eye.
    Pretty,
    /// JSON lines, for feeding diagnostics to other tools.
    Json,
}

impl TracingOutputFormat {
    /// Every log format, in the order they are documented.
    pub const ALL: [Self; 3] = [Self::Compact, Self::Pretty, Self::Json];

    /// Returns the name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl std_fmt::Display for TracingOutputFormat {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log format name that is not one of [`TracingOutputFormat::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log format `{0}` (expected compact, pretty or json)")]
pub struct UnknownLogFormat(pub String);

impl FromStr for TracingOutputFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLogFormat(s.to_string()))
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// The level used when RUST_LOG is not set
    pub default_level: Level,
    /// How records are laid out
    pub output_format: TracingOutputFormat,
    /// Whether records carry file and line
    pub include_location: bool,
    /// Whether records carry the module path
    pub include_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

impl TracingConfig {
    /// Config for normal CLI runs: skipped lines are shown as warnings.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: false,
        }
    }

    /// Config for `--debug` runs.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_target: true,
            ..Self::cli()
        }
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// The filter directive used when RUST_LOG is unset or invalid.
    pub fn default_directive(&self) -> String {
        format!("notecal={}", self.default_level)
    }

    fn stderr_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(self.include_target);

        match self.output_format {
            TracingOutputFormat::Compact => layer.compact().without_time().boxed(),
            TracingOutputFormat::Pretty => layer.pretty().without_time().boxed(),
            TracingOutputFormat::Json => layer.json().boxed(),
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// Call once, before any events are parsed.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(config.stderr_layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
