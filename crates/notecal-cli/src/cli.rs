//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use notecal_core::{OutputFormat, TracingOutputFormat};

/// notecal - Turn tagged note bullets into calendars, digests and JSON
#[derive(Debug, Parser)]
#[command(name = "notecal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format: structured (json), line-delimited (jsonl), calendar (ics) or summary (md)
    pub format: OutputFormat,

    /// Glob pattern of note files, or a .json/.jsonl file to reload
    pub input: String,

    /// Path to configuration file
    #[arg(env = "NOTECAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format on stderr: compact, pretty or json
    #[arg(long, env = "NOTECAL_LOG_FORMAT", default_value_t = TracingOutputFormat::Compact)]
    pub log_format: TracingOutputFormat,

    /// Date that `today`, `tmro` and friends resolve against (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,
}
