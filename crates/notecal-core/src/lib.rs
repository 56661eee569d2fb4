//! Core types: events, line scanning, attribute parsing, date resolution, formatting

pub mod attrs;
pub mod builder;
pub mod error;
pub mod event;
pub mod format;
pub mod options;
pub mod reload;
pub mod resolve;
pub mod scan;
pub mod time;
pub mod tracing;

pub use attrs::{ParsedLine, parse_line};
pub use builder::{EventBuilder, Extraction};
pub use error::{
    Diagnostic, EncodeError, FormatError, InvariantError, ParseError, ReloadError, ResolveError,
    SkipReason,
};
pub use event::{AttrValue, Event};
pub use format::{
    FormatOptions, OutputFormat, OutputFormatter, Rendered, StructuredOutput, UnknownFormat,
};
pub use options::ExtractOptions;
pub use reload::{ReloadFormat, reload};
pub use resolve::{DateResolver, Resolved, TimeHints, parse_duration};
pub use scan::{CandidateLine, SourceText, scan_lines, scan_sources};
pub use time::{EventTime, format_duration};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, UnknownLogFormat, init_tracing};
