//! Output formatting for extracted events.
//!
//! This module renders an event collection in one of four formats:
//! - **Structured**: a pretty JSON document holding every event
//! - **Line-delimited**: one compact JSON event per line
//! - **Calendar**: an iCalendar (RFC 5545) feed
//! - **Summary**: a Markdown digest grouped by tag
//!
//! The two JSON formats are lossless and can be fed back through
//! [`crate::reload`].
//!
//! # Example
//!
//! ```rust
//! use notecal_core::format::{FormatOptions, OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(FormatOptions::default());
//! let rendered = formatter.render(OutputFormat::Structured, &[]).unwrap();
//! assert!(rendered.text.contains("\"count\": 0"));
//! ```

pub mod calendar;
pub mod summary;

#[cfg(test)]
mod golden_tests;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Diagnostic, FormatError};
use crate::event::Event;

/// Default iCalendar product identifier.
pub const DEFAULT_PRODUCT_ID: &str = "-//notecal//NONSGML notes//EN";

/// Default placeholder for events without a description.
pub const DEFAULT_NO_DESCRIPTION_TEXT: &str = "(no description)";

/// The output format for an event collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty JSON document with all events.
    #[default]
    Structured,
    /// One JSON event per line.
    LineDelimited,
    /// iCalendar feed.
    Calendar,
    /// Markdown digest.
    Summary,
}

impl OutputFormat {
    /// All formats, in display order.
    pub const ALL: [OutputFormat; 4] = [
        Self::Structured,
        Self::LineDelimited,
        Self::Calendar,
        Self::Summary,
    ];

    /// Returns the canonical name of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::LineDelimited => "line-delimited",
            Self::Calendar => "calendar",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format `{0}` (expected structured, line-delimited, calendar or summary)")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "line-delimited" | "jsonl" | "ndjson" => Ok(Self::LineDelimited),
            "calendar" | "ics" => Ok(Self::Calendar),
            "summary" | "markdown" | "md" => Ok(Self::Summary),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Configuration options for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// `PRODID` of the calendar feed.
    pub product_id: String,
    /// Placeholder shown in summaries for events without a description.
    pub no_description_text: String,
    /// UTC time written as each calendar entry's `DTSTAMP`.
    pub generated_at: NaiveDateTime,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            no_description_text: DEFAULT_NO_DESCRIPTION_TEXT.to_string(),
            generated_at: NaiveDateTime::default(),
        }
    }
}

impl FormatOptions {
    /// Sets the calendar product identifier.
    #[must_use]
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    /// Sets the summary placeholder for missing descriptions.
    #[must_use]
    pub fn with_no_description_text(mut self, text: impl Into<String>) -> Self {
        self.no_description_text = text.into();
        self
    }

    /// Sets the generation timestamp (UTC).
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// The structured output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredOutput {
    /// Events in source order.
    pub events: Vec<Event>,
    /// Number of events.
    pub count: usize,
}

impl StructuredOutput {
    /// Wraps a collection, filling in the count.
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            count: events.len(),
            events,
        }
    }
}

/// Rendered output plus any events that could not be rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// The full output text.
    pub text: String,
    /// One entry per event left out of `text`.
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    fn text(text: String) -> Self {
        Self {
            text,
            diagnostics: Vec::new(),
        }
    }
}

/// Output formatter for event collections.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a new OutputFormatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Renders `events` in the given format.
    pub fn render(&self, format: OutputFormat, events: &[Event]) -> Result<Rendered, FormatError> {
        match format {
            OutputFormat::Structured => self.format_structured(events).map(Rendered::text),
            OutputFormat::LineDelimited => self.format_lines(events).map(Rendered::text),
            OutputFormat::Calendar => Ok(calendar::format_calendar(events, &self.options)),
            OutputFormat::Summary => summary::format_summary(events, &self.options).map(Rendered::text),
        }
    }

    /// Renders the structured document, newline-terminated.
    pub fn format_structured(&self, events: &[Event]) -> Result<String, FormatError> {
        let output = StructuredOutput::new(events.to_vec());
        let mut text = serde_json::to_string_pretty(&output)?;
        text.push('\n');
        Ok(text)
    }

    /// Renders one compact JSON object per event, each newline-terminated.
    pub fn format_lines(&self, events: &[Event]) -> Result<String, FormatError> {
        let mut text = String::new();
        for event in events {
            text.push_str(&serde_json::to_string(event)?);
            text.push('\n');
        }
        Ok(text)
    }
}
