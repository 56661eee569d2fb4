//! Candidate line detection.
//!
//! A candidate is a bullet line carrying a tag from the vocabulary:
//!
//! ```text
//!   - [ ] #todo {due="2022-09-26 14:08"} Call the bank | about the card
//! ```
//!
//! Everything else is filtered out silently; the scanner never fails.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::options::ExtractOptions;

/// Regex for a tagged bullet: indent, bullet, optional checkbox, `#tag`, rest.
///
/// The rest must be empty or start with whitespace or `{`, so `#todo-list`
/// is not read as tag `todo`.
static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*[-*+]\s+(?:\[(?P<check>[ xX])\]\s*)?#(?P<tag>\w+(?:\.\w+)*)(?P<rest>(?:[\s{].*)?)$",
    )
    .expect("Invalid bullet regex")
});

/// The pieces of a tagged bullet line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BulletParts<'a> {
    /// `Some(true)` for `[x]`, `Some(false)` for `[ ]`, `None` without a checkbox.
    pub checkbox: Option<bool>,
    pub tag: &'a str,
    /// Everything after the tag: the attribute block and free text.
    pub rest: &'a str,
}

/// Splits a line into its bullet parts, if it has the tagged-bullet shape.
pub(crate) fn match_bullet(line: &str) -> Option<BulletParts<'_>> {
    let caps = BULLET_REGEX.captures(line)?;
    let checkbox = caps.name("check").map(|m| m.as_str() != " ");
    let tag = caps.name("tag")?.as_str();
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    Some(BulletParts {
        checkbox,
        tag,
        rest,
    })
}

/// A note file's path and full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub path: PathBuf,
    pub content: String,
}

impl SourceText {
    /// Creates a new source text.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A line that looks like an event and should be handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLine {
    /// The file the line came from.
    pub source_file: PathBuf,
    /// The 1-based line number.
    pub line_number: usize,
    /// The raw line text.
    pub text: String,
}

impl CandidateLine {
    /// Creates a new candidate line.
    pub fn new(source_file: impl Into<PathBuf>, line_number: usize, text: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            line_number,
            text: text.into(),
        }
    }
}

/// Returns true if `line` is a tagged bullet whose tag the options accept.
pub fn is_candidate(line: &str, options: &ExtractOptions) -> bool {
    match_bullet(line).is_some_and(|parts| options.accepts_tag(parts.tag))
}

/// Filters `(path, line number, text)` triples down to candidate lines.
///
/// Input order is preserved.
pub fn scan_lines<'a, I>(lines: I, options: &ExtractOptions) -> Vec<CandidateLine>
where
    I: IntoIterator<Item = (&'a Path, usize, &'a str)>,
{
    lines
        .into_iter()
        .filter(|(_, _, text)| is_candidate(text, options))
        .map(|(path, number, text)| CandidateLine::new(path, number, text))
        .collect()
}

/// Scans whole files, numbering lines from 1, in the order given.
pub fn scan_sources(sources: &[SourceText], options: &ExtractOptions) -> Vec<CandidateLine> {
    scan_lines(
        sources.iter().flat_map(|source| {
            source
                .content
                .lines()
                .enumerate()
                .map(move |(idx, text)| (source.path.as_path(), idx + 1, text))
        }),
        options,
    )
}
