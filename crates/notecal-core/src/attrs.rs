//! Attribute parsing for candidate lines.
//!
//! The text after a bullet's tag has two parts, both optional:
//!
//! ```text
//! #todo {due="2022-09-26 14:08" prio=high .done} Title | description
//!       ^------------ attribute block ---------^ ^---- free text ----^
//! ```
//!
//! Inside the block, `key="value"` and `key=value` set text attributes and
//! `.flag` sets a boolean. Quoted values accept `\"`, `\\`, `\n` and `\t`.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

use tracing::debug;

use crate::error::ParseError;
use crate::event::AttrValue;
use crate::options::ExtractOptions;
use crate::resolve::TimeHints;
use crate::scan::{CandidateLine, match_bullet};

/// Attribute keys the pipeline interprets; all others are kept as extras.
pub const RECOGNIZED_KEYS: &[&str] = &["due", "start", "end", "duration", "allday", "done", "title"];

/// A candidate line broken into its fields, before date resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// The tag without `#`.
    pub tag: String,
    /// The checkbox state, if the line had one.
    pub checkbox: Option<bool>,
    /// Completion state after merging checkbox and `done` attribute.
    pub done: bool,
    /// The event title.
    pub title: String,
    /// The description, if any.
    pub description: Option<String>,
    /// The date-related attributes, unresolved.
    pub time_hints: TimeHints,
    /// Attributes not in [`RECOGNIZED_KEYS`].
    pub extra_attributes: BTreeMap<String, AttrValue>,
}

/// A single token from an attribute block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Pair(String, String),
    Flag(String),
}

/// Parses a candidate line into its fields.
pub fn parse_line(line: &CandidateLine, options: &ExtractOptions) -> Result<ParsedLine, ParseError> {
    let parts = match_bullet(&line.text).ok_or(ParseError::NotCandidate)?;

    let rest = parts.rest.trim_start();
    let (mut attributes, free_text) = match rest.strip_prefix('{') {
        Some(block) => {
            let (tokens, remainder) = parse_block(block)?;
            (collect_attributes(tokens), remainder)
        }
        None => (BTreeMap::new(), rest),
    };

    let (title, description) = match attributes.remove("title") {
        Some(title) => {
            let text = free_text.trim();
            let description = (!text.is_empty()).then(|| text.to_string());
            (title.to_string().trim().to_string(), description)
        }
        None => split_free_text(free_text, &options.description_separator),
    };
    if title.is_empty() {
        return Err(ParseError::EmptyTitle);
    }

    let done_flag = attributes
        .remove("done")
        .map(|v| parse_bool("done", &v))
        .transpose()?;
    let done = resolve_done(parts.checkbox, done_flag);
    if let (Some(checkbox), Some(flag)) = (parts.checkbox, done_flag)
        && checkbox != flag
    {
        debug!(
            file = %line.source_file.display(),
            line = line.line_number,
            checkbox,
            flag,
            "checkbox and done attribute disagree, checkbox wins"
        );
    }

    let time_hints = TimeHints {
        due: attributes.remove("due").map(|v| v.to_string()),
        start: attributes.remove("start").map(|v| v.to_string()),
        end: attributes.remove("end").map(|v| v.to_string()),
        duration: attributes.remove("duration").map(|v| v.to_string()),
        all_day: attributes
            .remove("allday")
            .map(|v| parse_bool("allday", &v))
            .transpose()?,
    };

    Ok(ParsedLine {
        tag: parts.tag.to_string(),
        checkbox: parts.checkbox,
        done,
        title,
        description,
        time_hints,
        extra_attributes: attributes,
    })
}

/// Merges the two completion sources: the checkbox wins when present.
pub fn resolve_done(checkbox: Option<bool>, flag: Option<bool>) -> bool {
    checkbox.or(flag).unwrap_or(false)
}

/// Parses a boolean attribute (`.flag`, or `true/false/yes/no/y/n/1/0`).
pub fn parse_bool(key: &str, value: &AttrValue) -> Result<bool, ParseError> {
    match value {
        AttrValue::Bool(b) => Ok(*b),
        AttrValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            _ => Err(ParseError::InvalidBool {
                key: key.to_string(),
                value: s.clone(),
            }),
        },
    }
}

/// Splits free text on the first separator into a trimmed title and description.
fn split_free_text(text: &str, separator: &str) -> (String, Option<String>) {
    match text.split_once(separator) {
        Some((title, description)) => (
            title.trim().to_string(),
            Some(description.trim().to_string()),
        ),
        None => (text.trim().to_string(), None),
    }
}

fn collect_attributes(tokens: Vec<Token>) -> BTreeMap<String, AttrValue> {
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Pair(key, value) => (key, AttrValue::Text(value)),
            Token::Flag(name) => (name, AttrValue::Bool(true)),
        })
        .collect()
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_token_end(c: char) -> bool {
    c.is_whitespace() || c == '}'
}

fn take_while(chars: &mut Peekable<CharIndices<'_>>, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !pred(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

/// Consumes the rest of a malformed token and reports it.
fn unexpected(chars: &mut Peekable<CharIndices<'_>>, prefix: &str) -> ParseError {
    let tail = take_while(chars, |c| !is_token_end(c));
    ParseError::UnexpectedToken {
        token: format!("{}{}", prefix, tail),
    }
}

/// Tokenizes an attribute block.
///
/// `input` starts just after the opening `{`. Returns the tokens and the
/// text following the closing `}`.
fn parse_block(input: &str) -> Result<(Vec<Token>, &str), ParseError> {
    let mut chars = input.char_indices().peekable();
    let mut tokens = Vec::new();

    loop {
        take_while(&mut chars, char::is_whitespace);
        let Some(&(idx, c)) = chars.peek() else {
            return Err(ParseError::UnmatchedBrace);
        };

        match c {
            '}' => return Ok((tokens, &input[idx + 1..])),
            '.' => {
                chars.next();
                let name = take_while(&mut chars, is_key_char);
                if name.is_empty() || chars.peek().is_some_and(|&(_, c)| !is_token_end(c)) {
                    return Err(unexpected(&mut chars, &format!(".{}", name)));
                }
                tokens.push(Token::Flag(name));
            }
            _ => {
                let key = take_while(&mut chars, is_key_char);
                if key.is_empty() || chars.peek().map(|&(_, c)| c) != Some('=') {
                    return Err(unexpected(&mut chars, &key));
                }
                chars.next();

                let value = if chars.peek().map(|&(_, c)| c) == Some('"') {
                    chars.next();
                    read_quoted(&mut chars, &key)?
                } else {
                    let value = take_while(&mut chars, |c| !is_token_end(c) && c != '"');
                    if value.is_empty() {
                        return Err(unexpected(&mut chars, &format!("{}=", key)));
                    }
                    value
                };

                if chars.peek().is_some_and(|&(_, c)| !is_token_end(c)) {
                    return Err(unexpected(&mut chars, &format!("{}={}", key, value)));
                }
                tokens.push(Token::Pair(key, value));
            }
        }
    }
}

/// Reads a quoted value up to the closing quote, decoding escapes.
fn read_quoted(chars: &mut Peekable<CharIndices<'_>>, key: &str) -> Result<String, ParseError> {
    let mut value = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(value),
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(ParseError::UnterminatedQuote {
        key: key.to_string(),
    })
}
