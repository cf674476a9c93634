//! Deterministic output file naming for downloaded archives.
//!
//! Every address maps to exactly one file name inside the destination
//! directory: the sanitized stem of the address's last path segment plus a
//! short SHA-256 digest of the full address, joined with a fixed extension.
//! Distinct addresses therefore never share a name, and re-downloading the
//! same address overwrites its previous file instead of creating a copy.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

/// Extension given to every downloaded archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Number of digest bytes rendered into the file name (16 hex chars).
const DIGEST_PREFIX_BYTES: usize = 8;

/// Maximum characters kept from the address stem.
const MAX_STEM_CHARS: usize = 64;

/// Returns the destination path for `address` under `dir`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use workshop_core::output_path_for;
///
/// let path = output_path_for(
///     Path::new("/tmp/out"),
///     "http://workshop9.abcvg.info/archive/636480/2721562982.zip",
/// );
/// let name = path.file_name().unwrap().to_str().unwrap();
/// assert!(name.starts_with("2721562982-"));
/// assert!(name.ends_with(".zip"));
/// ```
#[must_use]
pub fn output_path_for(dir: &Path, address: &str) -> PathBuf {
    dir.join(output_file_name(address))
}

/// Builds the file name for `address` (see [`output_path_for`]).
#[must_use]
pub fn output_file_name(address: &str) -> String {
    let digest = short_digest(address);
    match address_stem(address) {
        Some(stem) => format!("{stem}-{digest}.{ARCHIVE_EXTENSION}"),
        None => format!("{digest}.{ARCHIVE_EXTENSION}"),
    }
}

fn short_digest(address: &str) -> String {
    let digest = Sha256::digest(address.as_bytes());
    digest
        .iter()
        .take(DIGEST_PREFIX_BYTES)
        .fold(String::with_capacity(DIGEST_PREFIX_BYTES * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Sanitized last path segment without its extension, if any remains.
fn address_stem(address: &str) -> Option<String> {
    let parsed = Url::parse(address).ok()?;
    let last = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()?;
    let stem = last.rsplit_once('.').map_or(last, |(stem, _)| stem);

    let sanitized: String = stem
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => Some(c),
            '.' | ' ' | '+' => Some('_'),
            _ => None,
        })
        .take(MAX_STEM_CHARS)
        .collect();

    (!sanitized.is_empty()).then_some(sanitized)
}
