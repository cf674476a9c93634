//! Shared HTTP client construction policy.
//!
//! The scraper, the resolver and the downloader all build their `reqwest`
//! clients here so User-Agent, compression and timeout handling stay
//! consistent. Timeouts are opt-in: by default a slow peer is waited on
//! indefinitely, which matches the tool's single-attempt, no-retry model.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

/// Optional connect/read timeouts applied to every request of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Maximum time to establish a connection.
    pub connect: Option<Duration>,
    /// Maximum total time for a request including the body.
    pub read: Option<Duration>,
}

impl HttpTimeouts {
    /// No timeouts at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds timeouts from whole seconds, where `None` leaves that timeout unset.
    #[must_use]
    pub fn from_secs(connect_secs: Option<u64>, read_secs: Option<u64>) -> Self {
        Self {
            connect: connect_secs.map(Duration::from_secs),
            read: read_secs.map(Duration::from_secs),
        }
    }
}

/// Builds a client with the project User-Agent, gzip and the given timeouts.
///
/// # Errors
///
/// Returns the underlying `reqwest` error when client construction fails
/// (for example when the TLS backend cannot be initialized).
pub(crate) fn build_http_client(timeouts: HttpTimeouts) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent::default_user_agent())
        .gzip(true);

    if let Some(connect) = timeouts.connect {
        builder = builder.connect_timeout(connect);
    }
    if let Some(read) = timeouts.read {
        builder = builder.timeout(read);
    }

    debug!(?timeouts, "building HTTP client");
    builder.build()
}
