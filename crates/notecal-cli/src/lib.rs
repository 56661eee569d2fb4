//! CLI: input discovery, configuration, rendering to stdout
//!
//! This crate provides the `notecal` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod discover;
pub mod error;

pub use cli::Cli;
pub use config::NotecalConfig;
pub use error::{CliError, CliResult};
