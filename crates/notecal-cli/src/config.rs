//! CLI configuration.
//!
//! All settings live in a single `config.toml` file, by default at
//! `~/.config/notecal/config.toml`. Every key is optional; unknown keys are
//! rejected so typos do not go unnoticed.
//!
//! ```toml
//! tags = ["todo", "event"]
//! default_duration_minutes = 45
//! reference_date = "2022-09-27"
//! description_separator = "|"
//! no_description_text = "(no description)"
//! product_id = "-//notecal//NONSGML notes//EN"
//!
//! [relative_dates]
//! today = 0
//! tmro = 1
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use notecal_core::format::{DEFAULT_NO_DESCRIPTION_TEXT, DEFAULT_PRODUCT_ID};
use notecal_core::options::{
    DEFAULT_DESCRIPTION_SEPARATOR, DEFAULT_DURATION_MINUTES, DEFAULT_TAGS,
    MAX_DEFAULT_DURATION_MINUTES, MAX_RELATIVE_OFFSET_DAYS, default_relative_dates,
};
use notecal_core::{ExtractOptions, FormatOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Configuration for the notecal CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotecalConfig {
    /// Accepted tag roots. An empty list accepts every tag.
    pub tags: Vec<String>,

    /// Duration of timed events without an explicit end.
    pub default_duration_minutes: i64,

    /// Date that relative tokens resolve against; today when unset.
    pub reference_date: Option<NaiveDate>,

    /// Separator between title and description.
    pub description_separator: String,

    /// Summary placeholder for events without a description.
    pub no_description_text: String,

    /// Calendar `PRODID`.
    pub product_id: String,

    /// Relative-date vocabulary (token -> day offset). Replaces the default.
    pub relative_dates: BTreeMap<String, i64>,
}

impl Default for NotecalConfig {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            reference_date: None,
            description_separator: DEFAULT_DESCRIPTION_SEPARATOR.to_string(),
            no_description_text: DEFAULT_NO_DESCRIPTION_TEXT.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            relative_dates: default_relative_dates(),
        }
    }
}

impl NotecalConfig {
    /// Loads the explicit config file if given, else the default one if it exists.
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Loads configuration from the default path, or defaults if there is none.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads and validates configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_DEFAULT_DURATION_MINUTES).contains(&self.default_duration_minutes) {
            return Err(format!(
                "default_duration_minutes must be between 1 and {}, got {}",
                MAX_DEFAULT_DURATION_MINUTES, self.default_duration_minutes
            ));
        }
        if self.description_separator.is_empty() {
            return Err("description_separator must not be empty".to_string());
        }
        for tag in &self.tags {
            if !is_word(tag) {
                return Err(format!("invalid tag `{}`", tag));
            }
        }
        for (token, offset) in &self.relative_dates {
            if !is_word(token) {
                return Err(format!("invalid relative date token `{}`", token));
            }
            if !(-MAX_RELATIVE_OFFSET_DAYS..=MAX_RELATIVE_OFFSET_DAYS).contains(offset) {
                return Err(format!(
                    "relative date `{}` is more than {} days away",
                    token, MAX_RELATIVE_OFFSET_DAYS
                ));
            }
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notecal")
    }

    /// Picks the reference date: the CLI override, then the config, then today.
    pub fn reference_date(&self, override_date: Option<NaiveDate>) -> NaiveDate {
        override_date
            .or(self.reference_date)
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Builds the extraction options.
    pub fn extract_options(&self, reference_date: NaiveDate) -> ExtractOptions {
        ExtractOptions::new(reference_date)
            .with_tags(self.tags.iter().cloned())
            .with_default_duration_minutes(self.default_duration_minutes)
            .with_relative_dates(self.relative_dates.clone())
            .with_description_separator(self.description_separator.clone())
    }

    /// Builds the format options, stamped with the current UTC time.
    pub fn format_options(&self) -> FormatOptions {
        self.format_options_at(Utc::now().naive_utc())
    }

    /// Builds the format options with a fixed generation time.
    pub fn format_options_at(&self, generated_at: NaiveDateTime) -> FormatOptions {
        FormatOptions::default()
            .with_product_id(self.product_id.clone())
            .with_no_description_text(self.no_description_text.clone())
            .with_generated_at(generated_at)
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}
