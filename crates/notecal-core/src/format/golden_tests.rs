//! Golden tests for output formatting.
//!
//! These tests use insta for snapshot testing to ensure output format stability.
//! Run with `cargo insta review` to update snapshots after intentional changes.

use chrono::{NaiveDate, NaiveDateTime};
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime};

use crate::builder::EventBuilder;
use crate::event::Event;
use crate::format::{FormatOptions, OutputFormat, OutputFormatter};
use crate::options::ExtractOptions;
use crate::scan::SourceText;

const NOTE: &str = r#"# Monday

- [x] #todo {due="2022-09-26 14:08"} Call the bank | about the card
- #event {due=tmro duration=2d prio=high} Conference
- [ ] #todo {due=today .urgent} Water plants
"#;

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 9, 27)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn events_from(content: &str) -> Vec<Event> {
    let options = ExtractOptions::new(NaiveDate::from_ymd_opt(2022, 9, 27).unwrap());
    let extraction =
        EventBuilder::new(options).extract(&[SourceText::new("notes/2022-09-26.md", content)]);
    assert!(extraction.is_clean(), "{:?}", extraction.diagnostics);
    extraction.events
}

fn render(format: OutputFormat, events: &[Event]) -> String {
    let formatter = OutputFormatter::new(FormatOptions::default().with_generated_at(generated_at()));
    let rendered = formatter.render(format, events).unwrap();
    assert!(rendered.diagnostics.is_empty());
    rendered.text
}

fn parse_calendar(text: &str) -> Calendar {
    text.parse::<Calendar>().expect("calendar output should parse")
}

fn vevents(calendar: &Calendar) -> Vec<&icalendar::Event> {
    calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Summary
// ============================================================================

#[test]
fn golden_summary_grouped_by_tag() {
    let output = render(OutputFormat::Summary, &events_from(NOTE));
    insta::assert_snapshot!(output, @r###"
    # Events

    ## todo

    - [x] [[todo._log]] **Call the bank**
          about the card
          *origin:* [[2022-09-26]] (line 3)
          *time:* 2022-09-26 14:08 to 14:38 (duration: 0:30)
          ```json
          {"tag":"todo","title":"Call the bank","description":"about the card","done":true,"due_raw":"2022-09-26 14:08","start":{"type":"timed","value":"2022-09-26T14:08:00"},"end":{"type":"timed","value":"2022-09-26T14:38:00"},"all_day":false,"source_file":"notes/2022-09-26.md","source_line":3,"extra_attributes":{}}
          ```

    - [ ] [[todo._log]] **Water plants**
          (no description)
          *origin:* [[2022-09-26]] (line 5)
          *time:* 2022-09-27 (all day)
          ```json
          {"tag":"todo","title":"Water plants","description":null,"done":false,"due_raw":"today","start":{"type":"all_day","value":"2022-09-27"},"end":null,"all_day":true,"source_file":"notes/2022-09-26.md","source_line":5,"extra_attributes":{"urgent":true}}
          ```

    ## event

    - [ ] [[event._log]] **Conference**
          (no description)
          *origin:* [[2022-09-26]] (line 4)
          *time:* 2022-09-28 to 2022-09-29 (all day)
          ```json
          {"tag":"event","title":"Conference","description":null,"done":false,"due_raw":"tmro","start":{"type":"all_day","value":"2022-09-28"},"end":{"type":"all_day","value":"2022-09-29"},"all_day":true,"source_file":"notes/2022-09-26.md","source_line":4,"extra_attributes":{"prio":"high"}}
          ```
    "###);
}

#[test]
fn golden_summary_multi_day_and_custom_placeholder() {
    let events = events_from(
        r#"- #event {due="2022-09-26 23:00" end="2022-09-27 00:30"} Night shift
"#,
    );
    let formatter = OutputFormatter::new(FormatOptions::default().with_no_description_text("-"));
    let output = formatter.render(OutputFormat::Summary, &events).unwrap().text;
    insta::assert_snapshot!(output, @r###"
    # Events

    ## event

    - [ ] [[event._log]] **Night shift**
          -
          *origin:* [[2022-09-26]] (line 1)
          *time:* 2022-09-26 23:00 to 2022-09-27 00:30 (duration: 1:30)
          ```json
          {"tag":"event","title":"Night shift","description":null,"done":false,"due_raw":"2022-09-26 23:00","start":{"type":"timed","value":"2022-09-26T23:00:00"},"end":{"type":"timed","value":"2022-09-27T00:30:00"},"all_day":false,"source_file":"notes/2022-09-26.md","source_line":1,"extra_attributes":{}}
          ```
    "###);
}

#[test]
fn golden_summary_empty() {
    let output = render(OutputFormat::Summary, &[]);
    insta::assert_snapshot!(output, @"# Events");
}

// ============================================================================
// Calendar
// ============================================================================

#[test]
fn golden_calendar_header() {
    let output = render(OutputFormat::Calendar, &events_from(NOTE));
    assert!(output.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
    assert!(output.contains("PRODID:-//notecal//NONSGML notes//EN\r\n"));
    assert!(output.contains("CALSCALE:GREGORIAN\r\n"));
    assert!(output.contains("METHOD:PUBLISH\r\n"));
    assert!(output.ends_with("END:VCALENDAR\r\n"));
    assert_eq!(output.matches("BEGIN:VEVENT\r\n").count(), 3);
}

#[test]
fn golden_calendar_timed_event() {
    let output = render(OutputFormat::Calendar, &events_from(NOTE));
    assert!(output.contains("UID:notes/2022-09-26.md:3\r\n"));
    assert!(output.contains("DTSTAMP:20220927T080000Z\r\n"));
    assert!(output.contains("DTSTART:20220926T140800\r\n"));
    assert!(output.contains("DTEND:20220926T143800\r\n"));
    assert!(output.contains("SUMMARY:[x] Call the bank\r\n"));
    assert!(output.contains("DESCRIPTION:about the card\r\n"));
    assert!(output.contains("TRANSP:OPAQUE\r\n"));
    assert!(output.contains("STATUS:CONFIRMED\r\n"));
    assert!(output.contains("SEQUENCE:0\r\n"));
}

#[test]
fn golden_calendar_all_day_events() {
    let output = render(OutputFormat::Calendar, &events_from(NOTE));
    // 2-day conference: inclusive end 2022-09-29, exclusive DTEND the day after
    assert!(output.contains("DTSTART;VALUE=DATE:20220928\r\n"));
    assert!(output.contains("DTEND;VALUE=DATE:20220930\r\n"));
    assert!(output.contains("CATEGORIES:event\r\n"));
    assert!(output.contains("TRANSP:TRANSPARENT\r\n"));
    // open-ended all-day event has no DTEND
    assert!(output.contains("DTSTART;VALUE=DATE:20220927\r\n"));
    assert_eq!(output.matches("DTEND").count(), 2);
}

#[test]
fn golden_calendar_escapes_text() {
    let events = events_from(
        r#"- #todo {due="2022-09-26 10:00"} Buy milk, eggs; bread | at the shop\corner
"#,
    );
    let output = render(OutputFormat::Calendar, &events);
    assert!(output.contains(r"SUMMARY:Buy milk\, eggs\; bread"));
    assert!(output.contains(r"DESCRIPTION:at the shop\\corner"));
}

#[test]
fn golden_calendar_parses_back() {
    let events = events_from(NOTE);
    let calendar = parse_calendar(&render(OutputFormat::Calendar, &events));
    let parsed = vevents(&calendar);
    assert_eq!(parsed.len(), events.len());

    let uids: Vec<_> = parsed.iter().filter_map(|e| e.get_uid()).collect();
    assert_eq!(
        uids,
        vec![
            "notes/2022-09-26.md:3",
            "notes/2022-09-26.md:4",
            "notes/2022-09-26.md:5"
        ]
    );

    match parsed[0].get_start() {
        Some(DatePerhapsTime::DateTime(CalendarDateTime::Floating(dt))) => {
            assert_eq!(dt, events[0].start.to_naive_datetime());
        }
        other => panic!("expected a floating start, got {other:?}"),
    }
    match parsed[1].get_start() {
        Some(DatePerhapsTime::Date(date)) => {
            assert_eq!(date, NaiveDate::from_ymd_opt(2022, 9, 28).unwrap());
        }
        other => panic!("expected a date start, got {other:?}"),
    }
    assert!(parsed[2].get_end().is_none());
}

#[test]
fn golden_calendar_long_lines_are_folded() {
    let title = "word ".repeat(30);
    let events = events_from(&format!(
        "- #todo {{due=\"2022-09-26 10:00\"}} {}\n",
        title.trim()
    ));
    let output = render(OutputFormat::Calendar, &events);
    assert!(output.split("\r\n").all(|line| line.len() <= 75));

    let calendar = parse_calendar(&output);
    let parsed = vevents(&calendar);
    assert_eq!(parsed[0].get_summary(), Some(title.trim()));
}

#[test]
fn golden_calendar_multibyte_lines_are_folded_on_char_boundaries() {
    let title = "café ünïcødé ✓ ".repeat(12);
    let events = events_from(&format!(
        "- #todo {{due=\"2022-09-26 10:00\"}} {}\n",
        title.trim()
    ));
    let output = render(OutputFormat::Calendar, &events);
    assert!(output.split("\r\n").all(|line| line.len() <= 75));

    let calendar = parse_calendar(&output);
    let parsed = vevents(&calendar);
    assert_eq!(parsed[0].get_summary(), Some(title.trim()));
}

#[test]
fn golden_calendar_empty() {
    let output = render(OutputFormat::Calendar, &[]);
    assert!(!output.contains("BEGIN:VEVENT"));
    assert_eq!(vevents(&parse_calendar(&output)).len(), 0);
}

// ============================================================================
// Structured
// ============================================================================

#[test]
fn golden_structured_shape() {
    let output = render(OutputFormat::Structured, &events_from(NOTE));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["count"], 3);
    assert_eq!(value["events"][0]["start"]["type"], "timed");
    assert_eq!(value["events"][1]["extra_attributes"]["prio"], "high");
    assert_eq!(value["events"][2]["extra_attributes"]["urgent"], true);
    assert_eq!(value["events"][2]["end"], serde_json::Value::Null);
}
