//! Run-mode orchestration with per-item failure accounting.
//!
//! The [`Pipeline`] sequences scrape → dedupe → resolve → download for the
//! three run modes and hands every network-bound step to a [`TaskPool`]:
//!
//! - [`Pipeline::fetch`] scrapes listing pages and collects unique references
//! - [`Pipeline::generate`] resolves references to download addresses and
//!   optionally downloads them
//! - [`Pipeline::download`] downloads already-resolved addresses
//!
//! Run-level problems (missing application id, unusable download directory)
//! are returned as [`PipelineError`] before any item is processed. Per-item
//! failures are recorded in the returned report and never stop the run. Each
//! report is produced only after the pool's completion barrier, so its counts
//! cover every submitted item.
//!
//! # Example
//!
//! ```no_run
//! use workshop_core::{GenerateRequest, Pipeline, PipelineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let report = pipeline
//!     .generate(GenerateRequest {
//!         references: vec!["https://steamcommunity.com/sharedfiles/filedetails/?id=2721562982".into()],
//!         app_id: Some(636480),
//!         output: None,
//!         download_dir: Some("./downloads".into()),
//!     })
//!     .await?;
//! println!("resolve: {}", report.resolve);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod stats;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use stats::StageStats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::collection::dedupe;
use crate::download::{DownloadResult, Downloader, HttpDownloader, output_path_for};
use crate::list_file::write_list;
use crate::pool::TaskPool;
use crate::resolver::{LinkResolver, ResolvedLink, WorkshopResolver};
use crate::scrape::{HtmlScraper, PageScraper};

/// Input for [`Pipeline::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Listing page addresses to scrape.
    pub pages: Vec<String>,
    /// Where to persist the unique references, if anywhere.
    pub output: Option<PathBuf>,
}

/// Input for [`Pipeline::generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Item references to resolve.
    pub references: Vec<String>,
    /// Application the items belong to. Required.
    pub app_id: Option<u32>,
    /// Where to persist the resolved addresses, if anywhere.
    pub output: Option<PathBuf>,
    /// Download the resolved addresses into this directory, if given.
    pub download_dir: Option<PathBuf>,
}

/// Input for [`Pipeline::download`].
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    /// Direct download addresses.
    pub addresses: Vec<String>,
    /// Destination directory (created if missing).
    pub download_dir: PathBuf,
}

/// Outcome of a fetch run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Per-page scrape accounting.
    pub pages: StageStats,
    /// Number of references found before deduplication.
    pub raw_references: usize,
    /// Unique references in first-seen order.
    pub references: Vec<String>,
    /// Absolute path the references were written to.
    pub output: Option<PathBuf>,
}

/// Outcome of a generate run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// Per-reference resolve accounting.
    pub resolve: StageStats,
    /// One link per unique reference, in input order.
    pub links: Vec<ResolvedLink>,
    /// Absolute path the resolved addresses were written to.
    pub output: Option<PathBuf>,
    /// Download stage outcome, when downloading was requested.
    pub download: Option<DownloadReport>,
}

impl GenerateReport {
    /// Returns the unique resolved download addresses in input order.
    ///
    /// Distinct references may resolve to the same address; it is listed once.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        dedupe(self.links.iter().filter_map(ResolvedLink::target))
    }
}

/// Outcome of a download stage.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Absolute destination directory.
    pub download_dir: PathBuf,
    /// Per-address download accounting.
    pub stats: StageStats,
    /// One result per address, in completion order.
    pub results: Vec<DownloadResult>,
}

/// Orchestrates the scrape, resolve and download stages.
pub struct Pipeline {
    config: PipelineConfig,
    scraper: Arc<dyn PageScraper>,
    resolver: Arc<dyn LinkResolver>,
    downloader: Arc<dyn Downloader>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("resolver", &self.resolver.name())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline with HTTP-backed scraper, resolver and downloader.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] for invalid settings, or the
    /// construction error of the component that failed to build.
    #[instrument(level = "debug", skip(config), fields(concurrency = config.concurrency))]
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let scraper = HtmlScraper::new(&config.item_selector, config.timeouts)?;
        let resolver = WorkshopResolver::new(config.lookup_url.clone(), config.timeouts)?;
        let downloader = HttpDownloader::new(config.timeouts)?;

        Self::with_components(
            config,
            Arc::new(scraper),
            Arc::new(resolver),
            Arc::new(downloader),
        )
    }

    /// Creates a pipeline from explicit components.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] for invalid settings.
    pub fn with_components(
        config: PipelineConfig,
        scraper: Arc<dyn PageScraper>,
        resolver: Arc<dyn LinkResolver>,
        downloader: Arc<dyn Downloader>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        debug!(
            concurrency = config.concurrency,
            lookup_url = %config.lookup_url,
            resolver = resolver.name(),
            "creating pipeline"
        );

        Ok(Self {
            config,
            scraper,
            resolver,
            downloader,
        })
    }

    /// Scrapes every listing page and collects the unique item references.
    ///
    /// Pages that are not valid URLs or fail to load count as failed pages;
    /// the remaining pages are still scraped.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if no page is given, and
    /// [`PipelineError::ListFile`] if the requested output cannot be written.
    #[instrument(skip(self, request), fields(pages = request.pages.len()))]
    pub async fn fetch(&self, request: FetchRequest) -> Result<FetchReport, PipelineError> {
        if request.pages.is_empty() {
            return Err(PipelineError::configuration(
                "no listing page address given",
            ));
        }

        let verbose = self.config.verbose;
        let mut pool = TaskPool::new(self.config.concurrency)?;

        for (index, page) in request.pages.iter().enumerate() {
            if let Err(e) = Url::parse(page) {
                log_item_failure(verbose, "scrape", page, &format!("invalid page URL: {e}"));
                continue;
            }

            let scraper = Arc::clone(&self.scraper);
            let page = page.clone();
            pool.submit(async move {
                let scraped = scraper.scrape(&page).await;
                if let Err(e) = &scraped {
                    log_item_failure(verbose, "scrape", &page, e);
                }
                (index, scraped.ok())
            })
            .await?;
        }

        let mut scraped = pool.join().await;
        scraped.sort_by_key(|(index, _)| *index);

        let found: Vec<Vec<String>> = scraped.into_iter().filter_map(|(_, refs)| refs).collect();
        let pages = StageStats::from_counts(request.pages.len(), found.len());
        let raw: Vec<String> = found.into_iter().flatten().collect();
        let raw_references = raw.len();
        let references = dedupe(raw);

        let output = match request.output {
            Some(path) => Some(persist(&path, &references).await?),
            None => None,
        };

        info!(
            pages_attempted = pages.attempted(),
            pages_succeeded = pages.succeeded(),
            pages_failed = pages.failed(),
            raw_references,
            unique_references = references.len(),
            "fetch complete"
        );

        Ok(FetchReport {
            pages,
            raw_references,
            references,
            output,
        })
    }

    /// Resolves item references and optionally downloads the results.
    ///
    /// References are deduplicated first. The application id and the download
    /// directory are checked before any reference is resolved.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] without processing anything if
    /// `app_id` is missing, [`PipelineError::DownloadDir`] if the download
    /// directory cannot be created, and [`PipelineError::ListFile`] if the
    /// requested output cannot be written.
    #[instrument(skip(self, request), fields(references = request.references.len(), app_id = ?request.app_id))]
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateReport, PipelineError> {
        let Some(app_id) = request.app_id else {
            return Err(PipelineError::configuration(
                "an application id is required; dynamic app id discovery is not supported",
            ));
        };

        let download_dir = match &request.download_dir {
            Some(dir) => Some(prepare_download_dir(dir).await?),
            None => None,
        };

        let references = dedupe(request.references);
        let links = self.resolve_all(&references, app_id).await?;
        let resolve = StageStats::from_counts(
            references.len(),
            links.iter().filter(|link| link.is_resolved()).count(),
        );

        info!(
            attempted = resolve.attempted(),
            succeeded = resolve.succeeded(),
            failed = resolve.failed(),
            "resolve complete"
        );

        let targets = dedupe(links.iter().filter_map(ResolvedLink::target));

        let output = match request.output {
            Some(path) => Some(persist(&path, &targets).await?),
            None => None,
        };

        let download = match download_dir {
            Some(dir) => Some(self.download_all(targets, dir).await?),
            None => None,
        };

        Ok(GenerateReport {
            resolve,
            links,
            output,
            download,
        })
    }

    /// Downloads already-resolved addresses into a directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DownloadDir`] if the directory cannot be created.
    #[instrument(skip(self, request), fields(addresses = request.addresses.len(), dir = %request.download_dir.display()))]
    pub async fn download(&self, request: DownloadRequest) -> Result<DownloadReport, PipelineError> {
        let download_dir = prepare_download_dir(&request.download_dir).await?;
        let addresses = dedupe(request.addresses);
        self.download_all(addresses, download_dir).await
    }

    /// Resolves every reference on the pool, returning links in input order.
    async fn resolve_all(
        &self,
        references: &[String],
        app_id: u32,
    ) -> Result<Vec<ResolvedLink>, PipelineError> {
        let verbose = self.config.verbose;
        let mut pool = TaskPool::new(self.config.concurrency)?;

        for (index, reference) in references.iter().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            let reference = reference.clone();
            pool.submit(async move {
                let link = match resolver.resolve(&reference, app_id).await {
                    Ok(target) => {
                        debug!(reference = %reference, target = %target, "resolved");
                        ResolvedLink::resolved(reference, target)
                    }
                    Err(e) => {
                        log_item_failure(verbose, "resolve", &reference, &e);
                        ResolvedLink::failed(reference, &e)
                    }
                };
                (index, link)
            })
            .await?;
        }

        let mut indexed = pool.join().await;
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, link)| link).collect())
    }

    /// Downloads every address on the pool into `download_dir`.
    async fn download_all(
        &self,
        addresses: Vec<String>,
        download_dir: PathBuf,
    ) -> Result<DownloadReport, PipelineError> {
        let verbose = self.config.verbose;
        let attempted = addresses.len();
        let mut pool = TaskPool::new(self.config.concurrency)?;

        info!(
            count = attempted,
            dir = %download_dir.display(),
            "starting downloads"
        );

        for address in addresses {
            let downloader = Arc::clone(&self.downloader);
            let path = output_path_for(&download_dir, &address);
            pool.submit(async move {
                debug!(url = %address, path = %path.display(), "downloading");
                let attempt = downloader.download(&address, &path).await;
                if let Err(e) = &attempt {
                    log_item_failure(verbose, "download", &address, e);
                }
                DownloadResult::from_attempt(address, path, &attempt)
            })
            .await?;
        }

        let results = pool.join().await;
        let stats = StageStats::from_counts(
            attempted,
            results.iter().filter(|r| r.is_success()).count(),
        );

        info!(
            attempted = stats.attempted(),
            succeeded = stats.succeeded(),
            failed = stats.failed(),
            "downloads complete"
        );

        Ok(DownloadReport {
            download_dir,
            stats,
            results,
        })
    }
}

/// Logs a per-item failure; individually visible only in verbose mode.
fn log_item_failure(verbose: bool, stage: &str, item: &str, error: &dyn std::fmt::Display) {
    if verbose {
        warn!(stage, item, error = %error, "item failed");
    } else {
        debug!(stage, item, error = %error, "item failed");
    }
}

/// Makes the directory absolute and creates it if missing.
async fn prepare_download_dir(dir: &Path) -> Result<PathBuf, PipelineError> {
    let absolute = std::path::absolute(dir).map_err(|source| PipelineError::DownloadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    tokio::fs::create_dir_all(&absolute)
        .await
        .map_err(|source| PipelineError::DownloadDir {
            path: absolute.clone(),
            source,
        })?;

    Ok(absolute)
}

/// Writes a list file and returns its absolute path.
async fn persist(path: &Path, entries: &[String]) -> Result<PathBuf, PipelineError> {
    write_list(path, entries).await?;
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    info!(count = entries.len(), path = %absolute.display(), "saved list");
    Ok(absolute)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::download::DownloadError;
    use crate::resolver::ResolveError;
    use crate::scrape::ScrapeError;

    /// Scraper that returns a fixed list for `http://listing/ok` only.
    struct FixedScraper;

    #[async_trait]
    impl PageScraper for FixedScraper {
        async fn scrape(&self, page_url: &str) -> Result<Vec<String>, ScrapeError> {
            if page_url == "http://listing/ok" {
                Ok(vec![
                    "http://x/?id=1".to_string(),
                    "http://x/?id=2".to_string(),
                    "http://x/?id=1".to_string(),
                ])
            } else {
                Err(ScrapeError::HttpStatus {
                    url: page_url.to_string(),
                    status: 500,
                })
            }
        }
    }

    /// Resolver that counts calls and never succeeds.
    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LinkResolver for CountingResolver {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn resolve(&self, reference: &str, _app_id: u32) -> Result<String, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ResolveError::no_match(reference))
        }
    }

    /// Downloader that always fails.
    struct FailingDownloader;

    #[async_trait]
    impl Downloader for FailingDownloader {
        async fn download(&self, url: &str, _destination: &Path) -> Result<u64, DownloadError> {
            Err(DownloadError::http_status(url, 404))
        }
    }

    fn pipeline_with(resolver: Arc<CountingResolver>) -> Pipeline {
        Pipeline::with_components(
            PipelineConfig::default(),
            Arc::new(FixedScraper),
            resolver,
            Arc::new(FailingDownloader),
        )
        .unwrap()
    }

    #[test]
    fn test_with_components_rejects_invalid_config() {
        let config = PipelineConfig {
            concurrency: 0,
            ..PipelineConfig::default()
        };
        let result = Pipeline::with_components(
            config,
            Arc::new(FixedScraper),
            Arc::new(CountingResolver::default()),
            Arc::new(FailingDownloader),
        );
        assert!(result.unwrap_err().is_configuration());
    }

    #[tokio::test]
    async fn test_generate_without_app_id_processes_nothing() {
        let resolver = Arc::new(CountingResolver::default());
        let pipeline = pipeline_with(Arc::clone(&resolver));

        let result = pipeline
            .generate(GenerateRequest {
                references: vec!["http://x/?id=1".to_string()],
                app_id: None,
                ..GenerateRequest::default()
            })
            .await;

        assert!(result.unwrap_err().is_configuration());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_without_pages_is_configuration_error() {
        let pipeline = pipeline_with(Arc::new(CountingResolver::default()));
        let result = pipeline.fetch(FetchRequest::default()).await;
        assert!(result.unwrap_err().is_configuration());
    }

    #[tokio::test]
    async fn test_fetch_counts_failed_and_invalid_pages() {
        let pipeline = pipeline_with(Arc::new(CountingResolver::default()));

        let report = pipeline
            .fetch(FetchRequest {
                pages: vec![
                    "http://listing/ok".to_string(),
                    "http://listing/broken".to_string(),
                    "not a page".to_string(),
                ],
                output: None,
            })
            .await
            .unwrap();

        assert_eq!(report.pages.attempted(), 3);
        assert_eq!(report.pages.succeeded(), 1);
        assert_eq!(report.pages.failed(), 2);
        assert_eq!(report.raw_references, 3);
        assert_eq!(report.references, vec!["http://x/?id=1", "http://x/?id=2"]);
    }

    #[tokio::test]
    async fn test_generate_all_failures_are_counted() {
        let resolver = Arc::new(CountingResolver::default());
        let pipeline = pipeline_with(Arc::clone(&resolver));

        let report = pipeline
            .generate(GenerateRequest {
                references: vec![
                    "http://x/?id=1".to_string(),
                    "http://x/?id=2".to_string(),
                    "http://x/?id=2".to_string(),
                ],
                app_id: Some(1),
                ..GenerateRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.resolve.attempted(), 2);
        assert_eq!(report.resolve.failed(), 2);
        assert!(report.targets().is_empty());
        assert!(report.download.is_none());
    }

    #[tokio::test]
    async fn test_download_failures_are_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(Arc::new(CountingResolver::default()));

        let report = pipeline
            .download(DownloadRequest {
                addresses: vec![
                    "http://workshop1.abcvg.info/archive/1/1.zip".to_string(),
                    "http://workshop1.abcvg.info/archive/1/2.zip".to_string(),
                ],
                download_dir: dir.path().join("nested").join("out"),
            })
            .await
            .unwrap();

        assert_eq!(report.stats.attempted(), 2);
        assert_eq!(report.stats.failed(), 2);
        assert_eq!(report.results.len(), 2);
        assert!(report.download_dir.is_absolute());
        assert!(report.download_dir.is_dir());
    }

    #[tokio::test]
    async fn test_download_dir_that_is_a_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        tokio::fs::write(&file, b"x").await.unwrap();
        let pipeline = pipeline_with(Arc::new(CountingResolver::default()));

        let result = pipeline
            .download(DownloadRequest {
                addresses: vec!["http://workshop1.abcvg.info/archive/1/1.zip".to_string()],
                download_dir: file,
            })
            .await;

        assert!(matches!(result, Err(PipelineError::DownloadDir { .. })));
    }

    /// Resolves every reference to the same archive address.
    struct SingleAddressResolver;

    #[async_trait]
    impl LinkResolver for SingleAddressResolver {
        fn name(&self) -> &'static str {
            "single"
        }

        async fn resolve(&self, _reference: &str, _app_id: u32) -> Result<String, ResolveError> {
            Ok("http://workshop1.abcvg.info/archive/4000/1.zip".to_string())
        }
    }

    /// Downloader that records each destination it is asked to write.
    #[derive(Default)]
    struct RecordingDownloader {
        destinations: std::sync::Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl Downloader for RecordingDownloader {
        async fn download(&self, _url: &str, destination: &Path) -> Result<u64, DownloadError> {
            self.destinations
                .lock()
                .unwrap()
                .push(destination.to_path_buf());
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_generate_downloads_shared_address_once() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("links.txt");
        let downloader = Arc::new(RecordingDownloader::default());
        let pipeline = Pipeline::with_components(
            PipelineConfig::default(),
            Arc::new(FixedScraper),
            Arc::new(SingleAddressResolver),
            Arc::clone(&downloader) as Arc<dyn Downloader>,
        )
        .unwrap();

        let report = pipeline
            .generate(GenerateRequest {
                references: vec!["http://x/?id=1".to_string(), "http://x/?id=1&l=en".to_string()],
                app_id: Some(4000),
                output: Some(output.clone()),
                download_dir: Some(dir.path().join("mods")),
            })
            .await
            .unwrap();

        assert_eq!(report.resolve.attempted(), 2);
        assert_eq!(report.resolve.succeeded(), 2);
        assert_eq!(
            report.targets(),
            vec!["http://workshop1.abcvg.info/archive/4000/1.zip"]
        );

        let download = report.download.unwrap();
        assert_eq!(download.stats.attempted(), 1);
        assert_eq!(downloader.destinations.lock().unwrap().len(), 1);

        let saved = tokio::fs::read_to_string(&output).await.unwrap();
        assert_eq!(saved.lines().count(), 1);
    }
}
