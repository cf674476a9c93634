//! HTTP downloader streaming response bodies to disk.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::{DownloadError, Downloader};
use crate::http_client::{HttpTimeouts, build_http_client};

/// HTTP downloader with streaming support.
///
/// This downloader is designed to be created once and shared across pool
/// tasks, taking advantage of the client's connection pooling.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use workshop_core::download::{Downloader, HttpDownloader};
/// use workshop_core::HttpTimeouts;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = HttpDownloader::new(HttpTimeouts::none())?;
/// let bytes = downloader
///     .download("http://workshop9.abcvg.info/archive/636480/2721562982.zip", Path::new("./item.zip"))
///     .await?;
/// println!("Downloaded {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Creates a downloader with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, DownloadError> {
        let client =
            build_http_client(timeouts).map_err(|source| DownloadError::Client { source })?;
        Ok(Self { client })
    }

    /// Creates a downloader from an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    #[instrument(skip(self), fields(url = %url, path = %destination.display()))]
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        if !response.status().is_success() {
            return Err(DownloadError::http_status(url, response.status().as_u16()));
        }

        // Create (or truncate) only after the server accepted the request
        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let stream_result = stream_to_file(&mut file, response, url, destination).await;

        if stream_result.is_err() {
            debug!(path = %destination.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(destination).await;
        }

        let bytes = stream_result?;
        info!(path = %destination.display(), bytes, "download complete");
        Ok(bytes)
    }
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
