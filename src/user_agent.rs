//! Shared User-Agent string for scraper, resolver and download HTTP clients.

/// Default User-Agent for every outgoing request (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("workshop-util/{version}")
}
