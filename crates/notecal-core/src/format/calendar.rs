//! iCalendar rendering.
//!
//! Each event becomes one `VEVENT`. Timed events use floating local times
//! (no zone is known). All-day events use `VALUE=DATE`, and since the
//! stored all-day end is inclusive, `DTEND` is the day after it.

use chrono::NaiveDateTime;
use ics::components::Parameter;
use ics::properties::{
    CalScale, Categories, Description, DtEnd, DtStart, Method, Sequence, Status, Summary, Transp,
};
use ics::{ICalendar, escape_text};
use tracing::warn;

use crate::error::{Diagnostic, EncodeError};
use crate::event::Event;
use crate::format::{FormatOptions, Rendered};
use crate::time::EventTime;

/// Renders a calendar feed.
///
/// Events whose text cannot be carried by the format are left out, each
/// with a diagnostic; the rest are still rendered.
pub fn format_calendar(events: &[Event], options: &FormatOptions) -> Rendered {
    let mut calendar = ICalendar::new("2.0", options.product_id.as_str());
    calendar.push(CalScale::new("GREGORIAN"));
    calendar.push(Method::new("PUBLISH"));

    let dtstamp = format_utc(&options.generated_at);
    let mut diagnostics = Vec::new();

    for event in events {
        match build_event(event, &dtstamp) {
            Ok(vevent) => calendar.add_event(vevent),
            Err(e) => {
                let diagnostic = Diagnostic::new(event.source_file.clone(), event.source_line, e);
                warn!(%diagnostic, "Leaving event out of calendar");
                diagnostics.push(diagnostic);
            }
        }
    }

    Rendered {
        text: refold(&calendar.to_string()),
        diagnostics,
    }
}

/// Longest physical content line, in octets, including a fold's leading space.
const MAX_LINE_OCTETS: usize = 75;

/// Re-folds every content line to at most [`MAX_LINE_OCTETS`].
///
/// The `ics` writer folds continuation lines one octet too long.
fn refold(text: &str) -> String {
    let unfolded = text.replace("\r\n ", "");
    let mut out = String::with_capacity(unfolded.len() + unfolded.len() / 32);
    for line in unfolded.split_terminator("\r\n") {
        fold_line(line, &mut out);
        out.push_str("\r\n");
    }
    out
}

/// Appends `line`, breaking it only between chars.
fn fold_line(line: &str, out: &mut String) {
    let mut used = 0;
    for c in line.chars() {
        if used + c.len_utf8() > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(c);
        used += c.len_utf8();
    }
}

fn build_event<'a>(event: &'a Event, dtstamp: &str) -> Result<ics::Event<'a>, EncodeError> {
    check_text("tag", &event.tag)?;
    check_text("title", &event.title)?;
    if let Some(description) = &event.description {
        check_text("description", description)?;
    }

    let mut vevent = ics::Event::new(event.uid(), dtstamp.to_string());

    let mut dtstart = DtStart::new(format_event_time(&event.start));
    if event.start.is_all_day() {
        dtstart.add(date_value());
    }
    vevent.push(dtstart);

    if let Some(end) = &event.end {
        let end = match end {
            EventTime::AllDay(date) => {
                let next = date.succ_opt().ok_or_else(|| EncodeError::DateOutOfRange {
                    date: date.to_string(),
                })?;
                EventTime::AllDay(next)
            }
            timed => *timed,
        };
        let mut dtend = DtEnd::new(format_event_time(&end));
        if end.is_all_day() {
            dtend.add(date_value());
        }
        vevent.push(dtend);
    }

    let summary = if event.done {
        format!("[x] {}", event.title)
    } else {
        event.title.clone()
    };
    vevent.push(Summary::new(escape_text(summary)));
    if let Some(description) = &event.description {
        vevent.push(Description::new(escape_text(description.as_str())));
    }
    vevent.push(Categories::new(escape_text(event.tag.as_str())));
    vevent.push(Status::confirmed());
    vevent.push(if event.all_day {
        Transp::transparent()
    } else {
        Transp::opaque()
    });
    vevent.push(Sequence::new("0"));

    Ok(vevent)
}

fn date_value() -> Parameter<'static> {
    Parameter::new("VALUE", "DATE")
}

/// Rejects control characters other than newline and tab.
fn check_text(field: &'static str, text: &str) -> Result<(), EncodeError> {
    match text.chars().find(|c| c.is_control() && *c != '\n' && *c != '\t') {
        Some(c) => Err(EncodeError::ControlCharacter {
            field,
            code: u32::from(c),
        }),
        None => Ok(()),
    }
}

fn format_event_time(time: &EventTime) -> String {
    match time {
        EventTime::Timed(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
        EventTime::AllDay(date) => date.format("%Y%m%d").to_string(),
    }
}

fn format_utc(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}
