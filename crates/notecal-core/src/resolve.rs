//! Date resolution.
//!
//! Turns the raw `due`/`start`, `end`, `duration` and `allday` attributes
//! into a start, an optional end and an all-day indicator. Recognized start
//! forms, tried in order:
//!
//! 1. `2022-09-26 14:08` (also with seconds, or `T` as separator): timed
//! 2. `2022-09-26`: all-day
//! 3. a relative token such as `today` or `tmro`, optionally followed by a
//!    time (`tmro 09:30`), resolved against the configured reference date
//!
//! Resolution is pure: "today" is whatever the options say it is.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ResolveError;
use crate::options::ExtractOptions;
use crate::time::EventTime;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// The date-related attributes of a line, unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeHints {
    /// The `due` attribute.
    pub due: Option<String>,
    /// The `start` attribute, used when `due` is absent.
    pub start: Option<String>,
    /// The `end` attribute.
    pub end: Option<String>,
    /// The `duration` attribute.
    pub duration: Option<String>,
    /// The `allday` attribute, if given.
    pub all_day: Option<bool>,
}

impl TimeHints {
    /// Creates hints with only a due value.
    pub fn due(value: impl Into<String>) -> Self {
        Self {
            due: Some(value.into()),
            ..Self::default()
        }
    }

    /// Returns the raw start string: `due`, falling back to `start`.
    pub fn raw_start(&self) -> Option<&str> {
        self.due.as_deref().or(self.start.as_deref())
    }
}

/// The resolved temporal fields of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub all_day: bool,
}

/// Resolves date attributes against fixed options.
#[derive(Debug, Clone, Copy)]
pub struct DateResolver<'a> {
    options: &'a ExtractOptions,
}

impl<'a> DateResolver<'a> {
    /// Creates a resolver using the options' reference date and vocabulary.
    pub fn new(options: &'a ExtractOptions) -> Self {
        Self { options }
    }

    /// Resolves a full set of hints.
    pub fn resolve(&self, hints: &TimeHints) -> Result<Resolved, ResolveError> {
        let raw = hints.raw_start().ok_or(ResolveError::MissingDue)?;
        let mut start = self.parse_value(raw)?;

        // A bare date has no time to show, so `allday=false` cannot make it timed.
        let all_day = hints.all_day == Some(true) || start.is_all_day();
        if all_day {
            start = start.to_all_day();
        }

        let end = if let Some(raw_end) = &hints.end {
            Some(self.resolve_end(raw_end, all_day)?)
        } else if let Some(raw_duration) = &hints.duration {
            Some(Self::end_from_duration(start, raw_duration, all_day)?)
        } else if all_day {
            None
        } else {
            let end = self
                .options
                .default_duration()
                .and_then(|duration| start.checked_add(duration))
                .ok_or_else(|| ResolveError::OutOfRange {
                    value: raw.to_string(),
                })?;
            Some(end)
        };

        if let Some(end) = end
            && end.is_before(&start)
        {
            return Err(ResolveError::EndBeforeStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Resolved {
            start,
            end,
            all_day,
        })
    }

    /// Parses one date value into an [`EventTime`].
    pub fn parse_value(&self, value: &str) -> Result<EventTime, ResolveError> {
        let trimmed = value.trim();

        if let Some(dt) = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        {
            return Ok(EventTime::from_datetime(dt));
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(EventTime::from_date(date));
        }

        if let Some(et) = self.parse_relative(trimmed)? {
            return Ok(et);
        }

        Err(ResolveError::Unrecognized {
            value: value.to_string(),
        })
    }

    /// Parses `token` or `token HH:MM` using the relative-date vocabulary.
    ///
    /// `Ok(None)` means the value is not relative at all.
    fn parse_relative(&self, value: &str) -> Result<Option<EventTime>, ResolveError> {
        let mut words = value.split_whitespace();
        let Some(offset) = words.next().and_then(|w| self.options.relative_offset(w)) else {
            return Ok(None);
        };
        let date = Duration::try_days(offset)
            .and_then(|days| self.options.reference_date.checked_add_signed(days))
            .ok_or_else(|| ResolveError::OutOfRange {
                value: value.to_string(),
            })?;

        Ok(match (words.next(), words.next()) {
            (None, _) => Some(EventTime::from_date(date)),
            (Some(time), None) => TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
                .map(|time| EventTime::from_datetime(date.and_time(time))),
            _ => None,
        })
    }

    fn resolve_end(&self, raw_end: &str, all_day: bool) -> Result<EventTime, ResolveError> {
        let end = self.parse_value(raw_end)?;
        if all_day {
            Ok(end.to_all_day())
        } else if end.is_all_day() {
            Err(ResolveError::EndWithoutTime {
                value: raw_end.to_string(),
            })
        } else {
            Ok(end)
        }
    }

    /// Computes the end from a duration.
    ///
    /// All-day ends are inclusive, so a one-day duration ends on the start date.
    fn end_from_duration(
        start: EventTime,
        raw_duration: &str,
        all_day: bool,
    ) -> Result<EventTime, ResolveError> {
        let duration = parse_duration(raw_duration).ok_or_else(|| ResolveError::InvalidDuration {
            value: raw_duration.to_string(),
        })?;

        let out_of_range = || ResolveError::OutOfRange {
            value: raw_duration.to_string(),
        };

        if !all_day {
            return start.checked_add(duration).ok_or_else(out_of_range);
        }
        if duration.num_seconds() % Duration::days(1).num_seconds() != 0 {
            return Err(ResolveError::FractionalDays {
                value: raw_duration.to_string(),
            });
        }
        duration
            .checked_sub(&Duration::days(1))
            .and_then(|inclusive| start.checked_add(inclusive))
            .ok_or_else(out_of_range)
    }
}

/// Parses a duration such as `90m`, `1h30m`, `2h`, `45 min`, `2d` or `1:30`.
///
/// A bare number is minutes; trailing digits after a unit are minutes too
/// (`1h30` is ninety minutes).
pub fn parse_duration(value: &str) -> Option<Duration> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((hours, minutes)) = trimmed.split_once(':') {
        let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(hours) || !all_digits(minutes) {
            return None;
        }
        let hours: i64 = hours.parse().ok()?;
        let minutes: i64 = minutes.parse().ok()?;
        if minutes > 59 {
            return None;
        }
        return Duration::try_hours(hours)?.checked_add(&Duration::try_minutes(minutes)?);
    }

    let mut total = Duration::zero();
    let mut digits = String::new();
    let mut used_unit = false;
    let mut chars = trimmed.chars().filter(|c| !c.is_whitespace()).peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let mut unit = String::from(c);
        while let Some(&next) = chars.peek() {
            if !next.is_ascii_alphabetic() {
                break;
            }
            unit.push(next);
            chars.next();
        }
        let qty: i64 = digits.parse().ok()?;
        digits.clear();
        let part = match unit.as_str() {
            "d" | "day" | "days" => Duration::try_days(qty)?,
            "h" | "hr" | "hrs" | "hour" | "hours" => Duration::try_hours(qty)?,
            "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(qty)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
        used_unit = true;
    }

    if !digits.is_empty() {
        let qty: i64 = digits.parse().ok()?;
        total = total.checked_add(&Duration::try_minutes(qty)?)?;
        used_unit = true;
    }

    used_unit.then_some(total)
}
