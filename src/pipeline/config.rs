//! Pipeline configuration.

use url::Url;

use super::PipelineError;
use crate::http_client::HttpTimeouts;
use crate::pool::DEFAULT_POOL_CAPACITY;
use crate::resolver::DEFAULT_LOOKUP_URL;
use crate::scrape::DEFAULT_ITEM_SELECTOR;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Settings shared by every run mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum simultaneous scrape, resolve or download tasks.
    pub concurrency: usize,
    /// Lookup service endpoint used for resolution.
    pub lookup_url: String,
    /// CSS selector for item links on listing pages.
    pub item_selector: String,
    /// Optional HTTP timeouts for all outgoing requests.
    pub timeouts: HttpTimeouts,
    /// Log each per-item failure at warn level instead of debug.
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_POOL_CAPACITY,
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            item_selector: DEFAULT_ITEM_SELECTOR.to_string(),
            timeouts: HttpTimeouts::none(),
            verbose: false,
        }
    }
}

impl PipelineConfig {
    /// Validates values before any component is built.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(PipelineError::configuration(format!(
                "invalid concurrency {}: expected range {MIN_CONCURRENCY}..={MAX_CONCURRENCY}",
                self.concurrency
            )));
        }

        if let Err(e) = Url::parse(&self.lookup_url) {
            return Err(PipelineError::configuration(format!(
                "invalid lookup URL '{}': {e}",
                self.lookup_url
            )));
        }

        if self.item_selector.trim().is_empty() {
            return Err(PipelineError::configuration("item selector must not be empty"));
        }

        Ok(())
    }
}
