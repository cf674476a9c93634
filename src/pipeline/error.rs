//! Error types for pipeline runs.
//!
//! Only run-level failures surface here. Per-item failures (a reference that
//! does not resolve, an archive that fails to download) are recorded in the
//! run's report and never abort the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;
use crate::list_file::ListFileError;
use crate::pool::PoolError;
use crate::resolver::ResolveError;
use crate::scrape::ScrapeError;

/// Run-level errors from the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required run parameter is missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The download directory could not be prepared.
    #[error("cannot use download directory {path}: {source}")]
    DownloadDir {
        /// The directory as given.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Task pool failure.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Resolver construction failure.
    #[error(transparent)]
    Resolver(#[from] ResolveError),

    /// Scraper construction failure.
    #[error(transparent)]
    Scraper(#[from] ScrapeError),

    /// Downloader construction failure.
    #[error(transparent)]
    Downloader(#[from] DownloadError),

    /// Persisting an output list failed.
    #[error(transparent)]
    ListFile(#[from] ListFileError),
}

impl PipelineError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if this error stems from missing or invalid run parameters.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
