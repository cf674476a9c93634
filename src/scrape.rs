//! Listing page scraping.
//!
//! A listing page (a workshop collection or browse page) links to its items
//! through anchors matching a CSS selector. [`HtmlScraper`] fetches the page
//! once and returns every matching anchor's `href`, in document order.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::http_client::{HttpTimeouts, build_http_client};

/// Selector matching item links on workshop listing pages.
pub const DEFAULT_ITEM_SELECTOR: &str = ".workshopItem a";

/// Errors that can occur while scraping one listing page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The CSS selector could not be parsed.
    #[error("invalid item selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector as given.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// Network-level error while fetching the page.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The page URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The page returned a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The page URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The scraper's HTTP client could not be built.
    #[error("failed to build scraper HTTP client: {source}")]
    Client {
        /// The underlying client builder error.
        #[source]
        source: reqwest::Error,
    },
}

/// Capability to turn a listing page address into raw item references.
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Fetches `page_url` and returns the raw references it links to.
    async fn scrape(&self, page_url: &str) -> Result<Vec<String>, ScrapeError>;
}

/// Scraper that fetches pages over HTTP and selects anchors with a CSS selector.
#[derive(Debug, Clone)]
pub struct HtmlScraper {
    client: Client,
    selector: Selector,
}

impl HtmlScraper {
    /// Creates a scraper for `selector` with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidSelector`] if the selector does not parse,
    /// or [`ScrapeError::Client`] if the HTTP client cannot be built.
    pub fn new(selector: &str, timeouts: HttpTimeouts) -> Result<Self, ScrapeError> {
        let selector = parse_selector(selector)?;
        let client = build_http_client(timeouts).map_err(|source| ScrapeError::Client { source })?;
        Ok(Self { client, selector })
    }
}

#[async_trait]
impl PageScraper for HtmlScraper {
    #[instrument(skip(self))]
    async fn scrape(&self, page_url: &str) -> Result<Vec<String>, ScrapeError> {
        debug!("requesting listing page");

        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|source| ScrapeError::Network {
                url: page_url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ScrapeError::HttpStatus {
                url: page_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ScrapeError::Network {
                url: page_url.to_string(),
                source,
            })?;

        let references = extract_references(&body, &self.selector);
        debug!(found = references.len(), "scraped listing page");
        Ok(references)
    }
}

/// Parses a CSS selector, mapping parser errors into [`ScrapeError`].
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidSelector`] if the selector does not parse.
pub fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Returns the `href` of every element matching `selector`, in document order.
///
/// Matching elements without an `href` are skipped.
#[must_use]
pub fn extract_references(html: &str, selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .map(ToString::to_string)
        .collect()
}
