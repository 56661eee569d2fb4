//! The render command: discover input, build or reload events, render them.

use notecal_core::{
    EventBuilder, ExtractOptions, Extraction, FormatOptions, OutputFormat, OutputFormatter,
    Rendered, reload,
};
use tracing::{debug, info};

use crate::discover::{Input, discover};
use crate::error::{CliError, CliResult};

/// Renders the events named by `input` in `format`.
///
/// The whole output is built in memory; nothing is written here.
pub fn render(
    format: OutputFormat,
    input: &str,
    extract_options: ExtractOptions,
    format_options: FormatOptions,
) -> CliResult<Rendered> {
    let extraction = collect(discover(input)?, extract_options)?;
    let skipped_lines = extraction.diagnostics.len();

    let rendered = OutputFormatter::new(format_options).render(format, &extraction.events)?;
    debug!(
        %format,
        events = extraction.events.len(),
        skipped_lines,
        skipped_events = rendered.diagnostics.len(),
        "Rendered output"
    );
    if skipped_lines + rendered.diagnostics.len() > 0 {
        info!(
            skipped = skipped_lines + rendered.diagnostics.len(),
            "Some entries were skipped"
        );
    }

    Ok(rendered)
}

/// Turns discovered input into an event collection.
fn collect(input: Input, options: ExtractOptions) -> CliResult<Extraction> {
    match input {
        Input::Notes(sources) => Ok(EventBuilder::new(options).extract(&sources)),
        Input::Reload {
            path,
            content,
            format,
        } => reload(&path, &content, format).map_err(|source| CliError::Reload { path, source }),
    }
}
