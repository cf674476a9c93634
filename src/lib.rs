//! Workshop Utility Core Library
//!
//! This library provides the core functionality for the `workshop-util` tool,
//! which discovers workshop item references on listing pages, resolves each
//! reference to a direct archive address through a lookup service, and
//! downloads the archives under a concurrency bound.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`pool`] - Bounded task pool with an explicit completion barrier
//! - [`collection`] - Order-preserving reference deduplication
//! - [`scrape`] - Listing page scraping
//! - [`resolver`] - Item reference to download address resolution
//! - [`download`] - Streaming downloads to deterministic file names
//! - [`list_file`] - Newline-delimited list persistence
//! - [`pipeline`] - Run-mode orchestration and partial-failure accounting

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collection;
pub mod download;
mod http_client;
pub mod list_file;
pub mod pipeline;
pub mod pool;
pub mod resolver;
pub mod scrape;
mod user_agent;

// Re-export commonly used types
pub use collection::dedupe;
pub use download::{
    DownloadError, DownloadOutcome, DownloadResult, Downloader, HttpDownloader, output_path_for,
};
pub use http_client::HttpTimeouts;
pub use pipeline::{
    DownloadReport, DownloadRequest, FetchReport, FetchRequest, GenerateReport, GenerateRequest,
    Pipeline, PipelineConfig, PipelineError, StageStats,
};
pub use pool::{DEFAULT_POOL_CAPACITY, PoolError, TaskPool};
pub use resolver::{
    DEFAULT_LOOKUP_URL, LinkResolver, LookupPattern, ResolveError, ResolveStatus, ResolvedLink,
    WorkshopResolver,
};
pub use scrape::{DEFAULT_ITEM_SELECTOR, HtmlScraper, PageScraper, ScrapeError};
