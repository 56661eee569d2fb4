//! Event types for note events.
//!
//! This module provides the canonical record every output format consumes:
//! - [`Event`]: one task/event extracted from a tagged bullet line
//! - [`AttrValue`]: the value of an attribute the pipeline does not interpret

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::InvariantError;
use crate::time::EventTime;

/// The value of an attribute from a line's `{...}` block.
///
/// Flags (`.urgent`) become `Bool(true)`; `key="value"` pairs become `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A boolean flag.
    Bool(bool),
    /// A text value, unescaped.
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A normalized event extracted from a note.
///
/// This is the canonical representation shared by every serializer and
/// produced either by the extraction pipeline or by the reload path.
/// The serialized form of this struct is the structured output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The bullet's tag without the leading `#` (e.g. `todo`, `todo.work`).
    pub tag: String,
    /// The event title.
    pub title: String,
    /// The description, if the free text had one.
    pub description: Option<String>,
    /// Whether the event is completed.
    pub done: bool,
    /// The original, unparsed date string.
    pub due_raw: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends, if known.
    pub end: Option<EventTime>,
    /// Whether the event has no time of day.
    pub all_day: bool,
    /// The note file the event came from.
    pub source_file: PathBuf,
    /// The 1-based line within `source_file`.
    pub source_line: usize,
    /// Attributes the pipeline does not interpret, preserved verbatim.
    pub extra_attributes: BTreeMap<String, AttrValue>,
}

impl Event {
    /// Creates a new Event with required fields.
    ///
    /// `due_raw` defaults to empty and `all_day` follows `start`.
    pub fn new(
        tag: impl Into<String>,
        title: impl Into<String>,
        start: EventTime,
        source_file: impl Into<PathBuf>,
        source_line: usize,
    ) -> Self {
        Self {
            tag: tag.into(),
            title: title.into(),
            description: None,
            done: false,
            due_raw: String::new(),
            start,
            end: None,
            all_day: start.is_all_day(),
            source_file: source_file.into(),
            source_line,
            extra_attributes: BTreeMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the end time.
    #[must_use]
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets the completion state.
    #[must_use]
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Sets the raw due string.
    #[must_use]
    pub fn with_due_raw(mut self, due_raw: impl Into<String>) -> Self {
        self.due_raw = due_raw.into();
        self
    }

    /// Adds an uninterpreted attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.extra_attributes.insert(key.into(), value.into());
        self
    }

    /// Returns `end - start`, if there is an end.
    pub fn duration(&self) -> Option<Duration> {
        self.end
            .map(|end| end.to_naive_datetime() - self.start.to_naive_datetime())
    }

    /// Returns a stable identifier derived from the source location.
    pub fn uid(&self) -> String {
        format!("{}:{}", self.source_file.display(), self.source_line)
    }

    /// Returns the Markdown checkbox for this event's completion state.
    pub fn checkbox(&self) -> &'static str {
        if self.done { "[x]" } else { "[ ]" }
    }

    /// Checks the invariants every Event must satisfy.
    ///
    /// The extraction pipeline upholds these by construction; the reload
    /// path uses this to reject hand-edited records.
    pub fn validate(&self) -> Result<(), InvariantError> {
        if self.tag.trim().is_empty() {
            return Err(InvariantError::EmptyTag);
        }
        if self.title.trim().is_empty() {
            return Err(InvariantError::EmptyTitle);
        }
        if self.source_file.as_os_str().is_empty() {
            return Err(InvariantError::EmptySourceFile);
        }
        if self.source_line == 0 {
            return Err(InvariantError::ZeroSourceLine);
        }
        if self.all_day != self.start.is_all_day() {
            return Err(InvariantError::AllDayMismatch);
        }
        if let Some(end) = self.end {
            if end.is_all_day() != self.start.is_all_day() {
                return Err(InvariantError::KindMismatch);
            }
            if end.is_before(&self.start) {
                return Err(InvariantError::EndBeforeStart);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn timed_event() -> Event {
        Event::new(
            "todo",
            "Write report",
            EventTime::from_datetime(dt(2022, 9, 26, 14, 8)),
            "notes/daily.md",
            4,
        )
        .with_end(EventTime::from_datetime(dt(2022, 9, 26, 14, 38)))
    }

    mod attr_value {
        use super::*;

        #[test]
        fn untagged_serde() {
            let flag = AttrValue::Bool(true);
            assert_eq!(serde_json::to_string(&flag).unwrap(), "true");
            let text = AttrValue::from("high");
            assert_eq!(serde_json::to_string(&text).unwrap(), "\"high\"");

            let parsed: AttrValue = serde_json::from_str("true").unwrap();
            assert_eq!(parsed, flag);
            let parsed: AttrValue = serde_json::from_str("\"true\"").unwrap();
            assert_eq!(parsed, AttrValue::Text("true".to_string()));
        }

        #[test]
        fn display() {
            assert_eq!(AttrValue::Bool(false).to_string(), "false");
            assert_eq!(AttrValue::from("x y").to_string(), "x y");
        }
    }

    mod event {
        use super::*;

        #[test]
        fn new_follows_start_kind() {
            let e = Event::new(
                "todo",
                "t",
                EventTime::from_date(NaiveDate::from_ymd_opt(2022, 9, 27).unwrap()),
                "a.md",
                1,
            );
            assert!(e.all_day);
            assert!(!timed_event().all_day);
        }

        #[test]
        fn duration_and_uid() {
            let e = timed_event();
            assert_eq!(e.duration(), Some(Duration::minutes(30)));
            assert_eq!(e.uid(), "notes/daily.md:4");
        }

        #[test]
        fn checkbox() {
            assert_eq!(timed_event().checkbox(), "[ ]");
            assert_eq!(timed_event().with_done(true).checkbox(), "[x]");
        }

        #[test]
        fn validate_accepts_pipeline_shape() {
            assert_eq!(timed_event().validate(), Ok(()));
        }

        #[test]
        fn validate_rejects_end_before_start() {
            let e = timed_event().with_end(EventTime::from_datetime(dt(2022, 9, 26, 14, 0)));
            assert_eq!(e.validate(), Err(InvariantError::EndBeforeStart));
        }

        #[test]
        fn validate_rejects_mismatched_all_day() {
            let mut e = timed_event();
            e.all_day = true;
            assert_eq!(e.validate(), Err(InvariantError::AllDayMismatch));
        }

        #[test]
        fn serde_roundtrip() {
            let e = timed_event()
                .with_description("")
                .with_attribute("prio", "high")
                .with_attribute("urgent", true);
            let json = serde_json::to_string(&e).unwrap();
            let parsed: Event = serde_json::from_str(&json).unwrap();
            assert_eq!(e, parsed);
        }
    }
}
