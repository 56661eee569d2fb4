//! Time types for note events.
//!
//! This module provides [`EventTime`] for representing event start/end times
//! (which may be either a naive local datetime or an all-day date), and
//! [`format_duration`] for the `H:MM` durations shown in display formats.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Represents the time of a note event.
///
/// Note events can have two types of times:
/// - **Timed**: A specific local date and time of day
/// - **AllDay**: A date without a specific time (all-day events)
///
/// Times are naive: notes carry no zone information and none is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventTime {
    /// A specific local datetime.
    Timed(NaiveDateTime),
    /// An all-day event date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a new `EventTime::Timed`.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self::Timed(dt)
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Converts to a datetime for comparison purposes.
    ///
    /// For all-day events, returns midnight on that date.
    pub fn to_naive_datetime(&self) -> NaiveDateTime {
        match self {
            Self::Timed(dt) => *dt,
            Self::AllDay(date) => date.and_time(NaiveTime::MIN),
        }
    }

    /// Returns the date portion of this event time.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Timed(dt) => dt.date(),
            Self::AllDay(date) => *date,
        }
    }

    /// Drops the time of day, keeping the date.
    pub fn to_all_day(&self) -> Self {
        Self::AllDay(self.date())
    }

    /// Shifts this time forward by `duration`, or `None` past the calendar's range.
    ///
    /// All-day times only move by whole days; any remainder is dropped.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        match self {
            Self::Timed(dt) => dt.checked_add_signed(duration).map(Self::Timed),
            Self::AllDay(date) => {
                let days = Duration::try_days(duration.num_days())?;
                date.checked_add_signed(days).map(Self::AllDay)
            }
        }
    }

    /// Checks if this event time is before another event time.
    ///
    /// All-day times are compared at midnight.
    pub fn is_before(&self, other: &EventTime) -> bool {
        self.to_naive_datetime() < other.to_naive_datetime()
    }
}

impl fmt::Display for EventTime {
    /// Formats as `2022-09-26 14:08` (seconds only when non-zero) or `2022-09-27`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timed(dt) if dt.second() != 0 => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Timed(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            Self::AllDay(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_naive_datetime().cmp(&other.to_naive_datetime())
    }
}

/// Formats a duration as `H:MM`, rounded to the nearest minute.
///
/// Hours are not wrapped into days: 26 hours and 5 minutes is `26:05`.
/// Negative durations are rendered with a leading `-`.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let minutes = (seconds.abs() + 30) / 60;
    format!("{}{}:{:02}", sign, minutes / 60, minutes % 60)
}
