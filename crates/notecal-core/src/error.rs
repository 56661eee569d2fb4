//! Error and diagnostic types.
//!
//! Per-line failures never abort a run: they are wrapped in a [`Diagnostic`]
//! carrying the originating file and line, and the line is skipped.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while parsing a candidate line's attributes and text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not have the bullet/tag shape.
    #[error("not a tagged bullet line")]
    NotCandidate,

    /// A quoted attribute value is never closed.
    #[error("unterminated quote in value of `{key}`")]
    UnterminatedQuote { key: String },

    /// The attribute block has no closing brace.
    #[error("attribute block is missing its closing `}}`")]
    UnmatchedBrace,

    /// A token inside the attribute block is neither `key=value` nor `.flag`.
    #[error("unexpected token `{token}` in attribute block")]
    UnexpectedToken { token: String },

    /// A boolean attribute has a value that is not a boolean.
    #[error("invalid boolean `{value}` for `{key}`")]
    InvalidBool { key: String, value: String },

    /// The free text is empty, so there is no title.
    #[error("missing title")]
    EmptyTitle,
}

/// Errors produced while resolving an event's dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Neither `due` nor `start` was given.
    #[error("missing `due` attribute")]
    MissingDue,

    /// The value matches none of the recognized date forms.
    #[error("unrecognized date `{value}`")]
    Unrecognized { value: String },

    /// The duration attribute could not be parsed.
    #[error("invalid duration `{value}`")]
    InvalidDuration { value: String },

    /// An all-day event was given a duration that is not whole days.
    #[error("duration `{value}` is not a whole number of days for an all-day event")]
    FractionalDays { value: String },

    /// A timed event was given a date-only end.
    #[error("end `{value}` has no time of day but the event is timed")]
    EndWithoutTime { value: String },

    /// The end precedes the start.
    #[error("end `{end}` is before start `{start}`")]
    EndBeforeStart { start: String, end: String },

    /// A computed date falls outside the representable calendar.
    #[error("`{value}` is out of range")]
    OutOfRange { value: String },
}

/// Errors produced when a value cannot be represented in an output format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Text contains a control character the target grammar cannot carry.
    #[error("{field} contains control character U+{code:04X}")]
    ControlCharacter { field: &'static str, code: u32 },

    /// A date cannot be shifted as the format requires.
    #[error("date {date} is out of range")]
    DateOutOfRange { date: String },
}

/// Invariants an [`Event`](crate::event::Event) breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("empty tag")]
    EmptyTag,

    #[error("empty title")]
    EmptyTitle,

    #[error("empty source_file")]
    EmptySourceFile,

    #[error("source_line must be 1-based")]
    ZeroSourceLine,

    #[error("all_day does not match the kind of start")]
    AllDayMismatch,

    #[error("end and start are of different kinds")]
    KindMismatch,

    #[error("end is before start")]
    EndBeforeStart,
}

/// Errors produced while reloading structured output.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The document is not valid structured output.
    #[error("invalid structured document: {0}")]
    Json(#[from] serde_json::Error),

    /// A reloaded record breaks an event invariant.
    #[error("invalid event record: {0}")]
    Invalid(#[from] InvariantError),
}

/// Errors that abort rendering entirely.
#[derive(Debug, Error)]
pub enum FormatError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a line (or record, or event) was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Reload(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A recovered failure tied to a source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file the failure came from.
    pub source_file: PathBuf,
    /// The 1-based line number within that file.
    pub source_line: usize,
    /// What went wrong.
    pub reason: SkipReason,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(
        source_file: impl Into<PathBuf>,
        source_line: usize,
        reason: impl Into<SkipReason>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            source_line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.source_file.display(),
            self.source_line,
            self.reason
        )
    }
}

impl std::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}
