//! Newline-delimited list persistence.
//!
//! Reference and address lists are stored as plain text with one entry per
//! line. On read, surrounding whitespace (including `\r`) is trimmed and
//! blank lines are dropped. On write, every entry is followed by `\n`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from reading or writing list files.
#[derive(Debug, Error)]
pub enum ListFileError {
    /// The list file could not be read.
    #[error("failed to read list file {path}: {source}")]
    Read {
        /// The list file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The list file could not be written.
    #[error("failed to write list file {path}: {source}")]
    Write {
        /// The list file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Splits raw list text into entries.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Renders entries in list file format.
#[must_use]
pub fn render_list<S: AsRef<str>>(entries: &[S]) -> String {
    entries.iter().fold(String::new(), |mut out, entry| {
        out.push_str(entry.as_ref());
        out.push('\n');
        out
    })
}

/// Reads a list file.
///
/// # Errors
///
/// Returns [`ListFileError::Read`] if the file cannot be read as UTF-8 text.
#[instrument(level = "debug", fields(path = %path.display()))]
pub async fn read_list(path: &Path) -> Result<Vec<String>, ListFileError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ListFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_list(&raw))
}

/// Writes entries to a list file, replacing any existing content.
///
/// # Errors
///
/// Returns [`ListFileError::Write`] if the file cannot be created or written.
#[instrument(level = "debug", skip(entries), fields(path = %path.display(), count = entries.len()))]
pub async fn write_list<S: AsRef<str>>(path: &Path, entries: &[S]) -> Result<(), ListFileError> {
    tokio::fs::write(path, render_list(entries))
        .await
        .map_err(|source| ListFileError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Expands command-line inputs into list entries.
///
/// Each argument that names a readable file contributes the file's entries;
/// any other argument is taken literally as a single entry. An existing file
/// that cannot be read as UTF-8 text is also taken literally, logged at debug.
pub async fn expand_inputs(args: &[String]) -> Vec<String> {
    let mut entries = Vec::new();

    for arg in args {
        match read_list(Path::new(arg)).await {
            Ok(from_file) => {
                debug!(file = %arg, count = from_file.len(), "read entries from file");
                entries.extend(from_file);
            }
            Err(e) => {
                if Path::new(arg).exists() {
                    debug!(file = %arg, error = %e, "unreadable list file, using argument literally");
                }
                let literal = arg.trim();
                if !literal.is_empty() {
                    entries.push(literal.to_string());
                }
            }
        }
    }

    entries
}
