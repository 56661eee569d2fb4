//! Reloading previously rendered structured output.
//!
//! Both JSON renderings are lossless, so a collection can be read back and
//! sent through any serializer again without touching the original notes.
//! Stored fields are trusted as-is: free text is not re-parsed and dates are
//! not re-resolved. Records that break an [`Event`] invariant are skipped
//! with a diagnostic, like bad source lines.

use std::path::Path;

use tracing::{debug, warn};

use crate::builder::Extraction;
use crate::error::{Diagnostic, ReloadError, SkipReason};
use crate::event::Event;
use crate::format::StructuredOutput;

/// The two reloadable renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadFormat {
    /// A single `{"events": [...], "count": n}` document.
    Structured,
    /// One event object per line.
    LineDelimited,
}

impl ReloadFormat {
    /// Picks a format from a file extension (`.json`, `.jsonl`, `.ndjson`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Structured),
            "jsonl" | "ndjson" => Some(Self::LineDelimited),
            _ => None,
        }
    }

    /// Guesses the format from content.
    ///
    /// A document that parses as the structured container is structured; a
    /// document whose first non-blank line parses as an event is
    /// line-delimited. Anything else is not reloadable.
    pub fn sniff(content: &str) -> Option<Self> {
        if serde_json::from_str::<StructuredOutput>(content).is_ok() {
            return Some(Self::Structured);
        }
        let first = content.lines().find(|line| !line.trim().is_empty())?;
        serde_json::from_str::<Event>(first)
            .is_ok()
            .then_some(Self::LineDelimited)
    }
}

/// Reloads `content` read from `path` in the given format.
pub fn reload(path: &Path, content: &str, format: ReloadFormat) -> Result<Extraction, ReloadError> {
    let extraction = match format {
        ReloadFormat::Structured => from_structured(content)?,
        ReloadFormat::LineDelimited => from_lines(path, content),
    };
    debug!(
        path = %path.display(),
        ?format,
        events = extraction.events.len(),
        skipped = extraction.diagnostics.len(),
        "Reloaded events"
    );
    Ok(extraction)
}

/// Reloads a structured document.
///
/// A document that is not valid JSON of the right shape is an error;
/// individual records failing validation are skipped.
pub fn from_structured(content: &str) -> Result<Extraction, ReloadError> {
    let output: StructuredOutput = serde_json::from_str(content)?;
    if output.count != output.events.len() {
        warn!(
            count = output.count,
            events = output.events.len(),
            "Structured document count does not match its events"
        );
    }

    let mut extraction = Extraction::default();
    for event in output.events {
        match event.validate() {
            Ok(()) => extraction.events.push(event),
            Err(e) => {
                let diagnostic = Diagnostic::new(
                    event.source_file.clone(),
                    event.source_line,
                    SkipReason::Reload(ReloadError::from(e).to_string()),
                );
                warn!(%diagnostic, "Skipping record");
                extraction.diagnostics.push(diagnostic);
            }
        }
    }
    Ok(extraction)
}

/// Reloads line-delimited records.
///
/// Blank lines are ignored. Diagnostics point at the line within `path`.
pub fn from_lines(path: &Path, content: &str) -> Extraction {
    let mut extraction = Extraction::default();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(line) {
            Ok(event) => extraction.events.push(event),
            Err(e) => {
                let diagnostic = Diagnostic::new(path, idx + 1, SkipReason::Reload(e.to_string()));
                warn!(%diagnostic, "Skipping record");
                extraction.diagnostics.push(diagnostic);
            }
        }
    }
    extraction
}

fn parse_record(line: &str) -> Result<Event, ReloadError> {
    let event: Event = serde_json::from_str(line)?;
    event.validate()?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EventBuilder;
    use crate::format::{FormatOptions, OutputFormat, OutputFormatter};
    use crate::options::ExtractOptions;
    use crate::scan::SourceText;
    use chrono::NaiveDate;

    const NOTES: &str = r#"# 2022-09-26
- [x] #todo {due="2022-09-26 14:08" prio=high .urgent} Call the bank | about the card
- #event {due=tmro duration=2d} Conference | hall "B", room 3
- [ ] #todo.home {due="2022-09-27 09:00" end="2022-09-27 10:15"} Fix sink
- #vevent {due=today title="Dentist"}
"#;

    fn extracted() -> Vec<Event> {
        let options = ExtractOptions::new(NaiveDate::from_ymd_opt(2022, 9, 27).unwrap());
        let extraction = EventBuilder::new(options).extract(&[SourceText::new("notes/a.md", NOTES)]);
        assert!(extraction.is_clean(), "{:?}", extraction.diagnostics);
        extraction.events
    }

    fn render(format: OutputFormat, events: &[Event]) -> String {
        OutputFormatter::new(FormatOptions::default())
            .render(format, events)
            .unwrap()
            .text
    }

    mod round_trip {
        use super::*;

        #[test]
        fn structured() {
            let events = extracted();
            let text = render(OutputFormat::Structured, &events);
            let reloaded = from_structured(&text).unwrap();
            assert!(reloaded.is_clean());
            assert_eq!(reloaded.events, events);
        }

        #[test]
        fn line_delimited() {
            let events = extracted();
            let text = render(OutputFormat::LineDelimited, &events);
            let reloaded = from_lines(Path::new("out.jsonl"), &text);
            assert!(reloaded.is_clean());
            assert_eq!(reloaded.events, events);
        }

        #[test]
        fn empty_collection() {
            let text = render(OutputFormat::Structured, &[]);
            assert!(from_structured(&text).unwrap().events.is_empty());
            assert_eq!(render(OutputFormat::LineDelimited, &[]), "");
        }
    }

    mod detection {
        use super::*;

        #[test]
        fn by_extension() {
            assert_eq!(
                ReloadFormat::from_path(Path::new("x/out.json")),
                Some(ReloadFormat::Structured)
            );
            assert_eq!(
                ReloadFormat::from_path(Path::new("out.JSONL")),
                Some(ReloadFormat::LineDelimited)
            );
            assert_eq!(
                ReloadFormat::from_path(Path::new("out.ndjson")),
                Some(ReloadFormat::LineDelimited)
            );
            assert_eq!(ReloadFormat::from_path(Path::new("notes.md")), None);
            assert_eq!(ReloadFormat::from_path(Path::new("README")), None);
        }

        #[test]
        fn by_content() {
            let events = extracted();
            assert_eq!(
                ReloadFormat::sniff(&render(OutputFormat::Structured, &events)),
                Some(ReloadFormat::Structured)
            );
            assert_eq!(
                ReloadFormat::sniff(&render(OutputFormat::LineDelimited, &events)),
                Some(ReloadFormat::LineDelimited)
            );
            assert_eq!(ReloadFormat::sniff(NOTES), None);
            assert_eq!(ReloadFormat::sniff(""), None);
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn malformed_document_is_an_error() {
            assert!(matches!(
                from_structured("{\"events\": ["),
                Err(ReloadError::Json(_))
            ));
            assert!(matches!(
                from_structured("[]"),
                Err(ReloadError::Json(_))
            ));
        }

        #[test]
        fn bad_lines_are_skipped() {
            let events = extracted();
            let good = render(OutputFormat::LineDelimited, &events[..1]);
            let mut bad_event = events[1].clone();
            bad_event.title = String::new();
            let bad = serde_json::to_string(&bad_event).unwrap();
            let content = format!("{good}\nnot json\n{bad}\n");

            let reloaded = from_lines(Path::new("out.jsonl"), &content);
            assert_eq!(reloaded.events, events[..1].to_vec());
            let lines: Vec<_> = reloaded.diagnostics.iter().map(|d| d.source_line).collect();
            assert_eq!(lines, vec![3, 4]);
            assert_eq!(
                reloaded.diagnostics[1].reason,
                SkipReason::Reload("invalid event record: empty title".to_string())
            );
        }

        #[test]
        fn invalid_structured_record_is_skipped() {
            let mut events = extracted();
            events[0].source_line = 0;
            let output = StructuredOutput::new(events.clone());
            let text = serde_json::to_string(&output).unwrap();

            let reloaded = from_structured(&text).unwrap();
            assert_eq!(reloaded.events, events[1..].to_vec());
            assert_eq!(
                reloaded.diagnostics[0].reason,
                SkipReason::Reload("invalid event record: source_line must be 1-based".to_string())
            );
        }
    }
}
