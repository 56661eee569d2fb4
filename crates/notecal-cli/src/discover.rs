//! Input discovery.
//!
//! The input argument is either a glob pattern naming note files or the
//! path of a previously rendered structured/line-delimited file. A path to
//! an existing file is classified by extension first and by content second;
//! anything else is expanded as a glob.

use std::fs;
use std::path::{Path, PathBuf};

use notecal_core::{ReloadFormat, SourceText};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// What the input argument resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Note files to extract events from, in match order.
    Notes(Vec<SourceText>),
    /// A rendered file to reload.
    Reload {
        path: PathBuf,
        content: String,
        format: ReloadFormat,
    },
}

/// Resolves the input argument, reading every file it names.
pub fn discover(input: &str) -> CliResult<Input> {
    let path = Path::new(input);
    if path.is_file() {
        return classify_file(path);
    }

    let paths = expand_glob(input)?;
    let sources = paths
        .into_iter()
        .map(|path| {
            let content = read(&path)?;
            Ok(SourceText::new(path, content))
        })
        .collect::<CliResult<Vec<_>>>()?;
    debug!(pattern = input, files = sources.len(), "Matched note files");
    Ok(Input::Notes(sources))
}

/// Classifies a single existing file as reloadable output or a note.
fn classify_file(path: &Path) -> CliResult<Input> {
    let content = read(path)?;
    let format = ReloadFormat::from_path(path).or_else(|| ReloadFormat::sniff(&content));

    Ok(match format {
        Some(format) => {
            debug!(path = %path.display(), ?format, "Reloading structured input");
            Input::Reload {
                path: path.to_path_buf(),
                content,
                format,
            }
        }
        None => Input::Notes(vec![SourceText::new(path, content)]),
    })
}

/// Expands a glob pattern to the files it matches, in glob order.
pub fn expand_glob(pattern: &str) -> CliResult<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|source| CliError::Glob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            CliError::io(path, e.into_error())
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(CliError::NoInput(pattern.to_string()));
    }
    Ok(paths)
}

fn read(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}
