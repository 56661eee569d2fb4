//! notecal CLI entry point.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use notecal_core::tracing::{TracingConfig, init_tracing};

use notecal_cli::cli::Cli;
use notecal_cli::commands;
use notecal_cli::config::NotecalConfig;
use notecal_cli::error::{CliError, CliResult};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    init_tracing(tracing_config.with_format(cli.log_format))?;

    let config = NotecalConfig::resolve(cli.config.as_deref())?;
    let extract_options = config.extract_options(config.reference_date(cli.today));
    let format_options = config.format_options();

    let rendered = commands::render::render(cli.format, &cli.input, extract_options, format_options)?;

    // Only write once everything rendered, so failures leave stdout empty.
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(rendered.text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(CliError::Output)
}
