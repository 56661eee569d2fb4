//! Immutable extraction options.
//!
//! [`ExtractOptions`] carries everything the scanner, attribute parser and
//! date resolver need. It is built once at startup and passed by reference;
//! nothing in the pipeline reads configuration from anywhere else.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default duration applied to timed events without an explicit end.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Longest default duration a configuration may ask for (one year).
pub const MAX_DEFAULT_DURATION_MINUTES: i64 = 366 * 24 * 60;

/// Largest relative-date offset a configuration may define, in days either way.
pub const MAX_RELATIVE_OFFSET_DAYS: i64 = 100 * 366;

/// Default separator between title and description in the free text.
pub const DEFAULT_DESCRIPTION_SEPARATOR: &str = "|";

/// Tags recognized when no vocabulary is configured.
pub const DEFAULT_TAGS: &[&str] = &["todo", "event", "vtodo", "vevent"];

/// Returns the default relative-date vocabulary (token -> day offset).
pub fn default_relative_dates() -> BTreeMap<String, i64> {
    [
        ("today", 0),
        ("tod", 0),
        ("tomorrow", 1),
        ("tom", 1),
        ("tmro", 1),
        ("tmr", 1),
    ]
    .into_iter()
    .map(|(token, offset)| (token.to_string(), offset))
    .collect()
}

/// Options controlling line extraction and date resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Accepted tag roots (the part of `#todo.work` before the first dot).
    ///
    /// An empty list accepts every tag.
    pub tags: Vec<String>,
    /// Duration given to timed events without an explicit end.
    pub default_duration_minutes: i64,
    /// The date relative tokens such as `today` resolve against.
    pub reference_date: NaiveDate,
    /// Relative-date vocabulary, keyed by lowercase token.
    pub relative_dates: BTreeMap<String, i64>,
    /// Separator between title and description.
    pub description_separator: String,
}

impl ExtractOptions {
    /// Creates options with the default vocabulary for the given reference date.
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            reference_date,
            relative_dates: default_relative_dates(),
            description_separator: DEFAULT_DESCRIPTION_SEPARATOR.to_string(),
        }
    }

    /// Sets the accepted tag vocabulary.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the default event duration in minutes.
    #[must_use]
    pub fn with_default_duration_minutes(mut self, minutes: i64) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    /// Replaces the relative-date vocabulary. Tokens are lowercased.
    #[must_use]
    pub fn with_relative_dates(mut self, vocabulary: BTreeMap<String, i64>) -> Self {
        self.relative_dates = vocabulary
            .into_iter()
            .map(|(token, offset)| (token.to_lowercase(), offset))
            .collect();
        self
    }

    /// Sets the title/description separator.
    #[must_use]
    pub fn with_description_separator(mut self, separator: impl Into<String>) -> Self {
        self.description_separator = separator.into();
        self
    }

    /// Returns the default duration, or `None` if it does not fit a [`Duration`].
    pub fn default_duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.default_duration_minutes)
    }

    /// Returns true if a tag (possibly dotted) belongs to the vocabulary.
    pub fn accepts_tag(&self, tag: &str) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        let root = tag.split('.').next().unwrap_or(tag);
        self.tags.iter().any(|t| t == root)
    }

    /// Looks up a relative-date token, ignoring case.
    pub fn relative_offset(&self, token: &str) -> Option<i64> {
        self.relative_dates.get(&token.to_lowercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ExtractOptions {
        ExtractOptions::new(NaiveDate::from_ymd_opt(2022, 9, 27).unwrap())
    }

    #[test]
    fn default_values() {
        let opts = options();
        assert_eq!(opts.default_duration_minutes, 30);
        assert_eq!(opts.description_separator, "|");
        assert_eq!(opts.tags, vec!["todo", "event", "vtodo", "vevent"]);
        assert_eq!(opts.default_duration(), Some(Duration::minutes(30)));
    }

    #[test]
    fn accepts_dotted_tags_by_root() {
        let opts = options();
        assert!(opts.accepts_tag("todo"));
        assert!(opts.accepts_tag("todo.work"));
        assert!(!opts.accepts_tag("idea"));
        assert!(!opts.accepts_tag("todos"));
    }

    #[test]
    fn empty_vocabulary_accepts_everything() {
        let opts = options().with_tags(Vec::<String>::new());
        assert!(opts.accepts_tag("anything"));
    }

    #[test]
    fn relative_lookup_is_case_insensitive() {
        let opts = options();
        assert_eq!(opts.relative_offset("TODAY"), Some(0));
        assert_eq!(opts.relative_offset("Tmro"), Some(1));
        assert_eq!(opts.relative_offset("someday"), None);
    }

    #[test]
    fn custom_vocabulary_is_lowercased() {
        let vocab = BTreeMap::from([("Yesterday".to_string(), -1)]);
        let opts = options().with_relative_dates(vocab);
        assert_eq!(opts.relative_offset("yesterday"), Some(-1));
        assert_eq!(opts.relative_offset("today"), None);
    }
}
