//! Markdown summary rendering.
//!
//! Events are grouped under one `## <tag>` heading per tag, tags in the
//! order they are first seen and events in source order. Each event is a
//! checkbox item linking back to its note, followed by its time range and
//! a fenced copy of its JSON record.

use std::path::Path;

use chrono::{NaiveDateTime, Timelike};

use crate::error::FormatError;
use crate::event::Event;
use crate::format::FormatOptions;
use crate::time::{EventTime, format_duration};

/// Continuation lines line up with the text after `- [x] `.
const INDENT: &str = "      ";

/// Renders the Markdown summary.
pub fn format_summary(events: &[Event], options: &FormatOptions) -> Result<String, FormatError> {
    let mut out = String::from("# Events\n");

    for (tag, group) in group_by_tag(events) {
        out.push_str(&format!("\n## {}\n", tag));
        for event in group {
            out.push('\n');
            push_event(&mut out, event, options)?;
        }
    }

    Ok(out)
}

/// Groups events by tag, keeping first-seen tag order and source order.
pub fn group_by_tag(events: &[Event]) -> Vec<(&str, Vec<&Event>)> {
    let mut groups: Vec<(&str, Vec<&Event>)> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|(tag, _)| *tag == event.tag) {
            Some((_, group)) => group.push(event),
            None => groups.push((event.tag.as_str(), vec![event])),
        }
    }
    groups
}

fn push_event(out: &mut String, event: &Event, options: &FormatOptions) -> Result<(), FormatError> {
    out.push_str(&format!(
        "- {} [[{}._log]] **{}**\n",
        event.checkbox(),
        event.tag,
        event.title
    ));

    match &event.description {
        None => push_line(out, &options.no_description_text),
        Some(description) => {
            for line in description.lines() {
                push_line(out, line);
            }
        }
    }

    push_line(
        out,
        &format!(
            "*origin:* [[{}]] (line {})",
            note_name(&event.source_file),
            event.source_line
        ),
    );
    push_line(out, &format!("*time:* {}", time_range(event)));

    push_line(out, "```json");
    push_line(out, &serde_json::to_string(event)?);
    push_line(out, "```");
    Ok(())
}

/// Pushes an indented line, without trailing whitespace.
fn push_line(out: &mut String, text: &str) {
    let text = text.trim_end();
    if !text.is_empty() {
        out.push_str(INDENT);
        out.push_str(text);
    }
    out.push('\n');
}

/// The note's name as used in a wiki link: its file stem.
fn note_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Formats an event's time range for display.
///
/// ```text
/// 2022-09-26 14:08 to 14:38 (duration: 0:30)
/// 2022-09-26 23:00 to 2022-09-27 00:30 (duration: 1:30)
/// 2022-09-27 (all day)
/// 2022-09-27 to 2022-09-29 (all day)
/// ```
pub fn time_range(event: &Event) -> String {
    match (event.start, event.end) {
        (EventTime::AllDay(start), Some(EventTime::AllDay(end))) if end > start => format!(
            "{} to {} (all day)",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        (EventTime::AllDay(start), _) => format!("{} (all day)", start.format("%Y-%m-%d")),
        (start, Some(end)) => {
            let end_text = match (start, end) {
                (EventTime::Timed(s), EventTime::Timed(e)) if s.date() == e.date() => clock(&e),
                _ => end.to_string(),
            };
            let duration = event.duration().map(format_duration).unwrap_or_default();
            format!("{} to {} (duration: {})", start, end_text, duration)
        }
        (start, None) => start.to_string(),
    }
}

fn clock(dt: &NaiveDateTime) -> String {
    if dt.second() == 0 {
        dt.format("%H:%M").to_string()
    } else {
        dt.format("%H:%M:%S").to_string()
    }
}
