//! Streaming downloads of resolved archive addresses.
//!
//! This module provides the [`Downloader`] seam used by the pipeline, the
//! HTTP implementation [`HttpDownloader`], and the per-item
//! [`DownloadResult`] recorded for accounting.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large archives)
//! - Deterministic destination names derived from the address
//! - A single attempt per address: no retry, no integrity verification
//! - Structured error types with full context

mod client;
mod error;
mod filename;

pub use client::HttpDownloader;
pub use error::DownloadError;
pub use filename::{ARCHIVE_EXTENSION, output_file_name, output_path_for};

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Trait for components that fetch one remote resource into a local file.
///
/// Implementations create (or overwrite) the file at `destination` and
/// return the number of bytes written.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `url` into `destination`.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError>;
}

/// Terminal state of a single download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was written completely.
    Success {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// The download failed; any partial file was removed.
    Failure {
        /// Human-readable failure reason.
        reason: String,
    },
}

/// Result of downloading one address, recorded for counting and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// The address that was fetched.
    pub source: String,
    /// The local destination path.
    pub path: PathBuf,
    /// Download outcome.
    pub outcome: DownloadOutcome,
}

impl DownloadResult {
    /// Records the outcome of a download attempt.
    #[must_use]
    pub fn from_attempt(
        source: impl Into<String>,
        path: impl Into<PathBuf>,
        attempt: &Result<u64, DownloadError>,
    ) -> Self {
        let outcome = match attempt {
            Ok(bytes) => DownloadOutcome::Success { bytes: *bytes },
            Err(e) => DownloadOutcome::Failure {
                reason: e.to_string(),
            },
        };
        Self {
            source: source.into(),
            path: path.into(),
            outcome,
        }
    }

    /// Returns true if the download succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Success { .. })
    }
}
