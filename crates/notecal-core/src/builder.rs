//! Event construction.
//!
//! Combines the attribute parser and the date resolver into [`Event`]s.
//! Failures are folded into diagnostics; a bad line never stops the run.

use tracing::{debug, warn};

use crate::attrs::parse_line;
use crate::error::{Diagnostic, SkipReason};
use crate::event::Event;
use crate::options::ExtractOptions;
use crate::resolve::DateResolver;
use crate::scan::{CandidateLine, SourceText, scan_sources};

/// The outcome of an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Events in source order.
    pub events: Vec<Event>,
    /// One entry per skipped line.
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// Returns true if no line was skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Builds events from candidate lines.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    options: ExtractOptions,
}

impl EventBuilder {
    /// Creates a new builder with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Builds a single event from a candidate line.
    pub fn build_line(&self, line: &CandidateLine) -> Result<Event, Diagnostic> {
        let diagnostic =
            |reason: SkipReason| Diagnostic::new(line.source_file.clone(), line.line_number, reason);

        let parsed = parse_line(line, &self.options).map_err(|e| diagnostic(e.into()))?;
        let resolved = DateResolver::new(&self.options)
            .resolve(&parsed.time_hints)
            .map_err(|e| diagnostic(e.into()))?;

        let due_raw = parsed.time_hints.raw_start().unwrap_or_default().to_string();
        let event = Event {
            tag: parsed.tag,
            title: parsed.title,
            description: parsed.description,
            done: parsed.done,
            due_raw,
            start: resolved.start,
            end: resolved.end,
            all_day: resolved.all_day,
            source_file: line.source_file.clone(),
            source_line: line.line_number,
            extra_attributes: parsed.extra_attributes,
        };

        debug!(
            file = %event.source_file.display(),
            line = event.source_line,
            tag = %event.tag,
            start = %event.start,
            "Parsed event"
        );
        Ok(event)
    }

    /// Builds every candidate, collecting events and diagnostics in order.
    pub fn build<'a, I>(&self, candidates: I) -> Extraction
    where
        I: IntoIterator<Item = &'a CandidateLine>,
    {
        let mut extraction = Extraction::default();
        for candidate in candidates {
            match self.build_line(candidate) {
                Ok(event) => extraction.events.push(event),
                Err(diagnostic) => {
                    warn!(
                        file = %diagnostic.source_file.display(),
                        line = diagnostic.source_line,
                        reason = %diagnostic.reason,
                        "Skipping line"
                    );
                    extraction.diagnostics.push(diagnostic);
                }
            }
        }
        extraction
    }

    /// Scans and builds whole files.
    pub fn extract(&self, sources: &[SourceText]) -> Extraction {
        let candidates = scan_sources(sources, &self.options);
        debug!(
            files = sources.len(),
            candidates = candidates.len(),
            "Scanned sources"
        );
        self.build(&candidates)
    }
}
