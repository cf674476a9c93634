//! Item reference resolution into direct download addresses.
//!
//! A workshop item reference is a page URL carrying the item identifier in
//! its `id` query parameter. Resolution asks an external lookup service for
//! the item's archive and scans the reply for a direct download address.
//!
//! # Architecture
//!
//! - [`LinkResolver`] - Async trait that resolvers implement
//! - [`WorkshopResolver`] - Lookup-service backed implementation
//! - [`LookupPattern`] - Compiled download address pattern, owned by the resolver
//! - [`ResolvedLink`] - Per-item outcome recorded at the item boundary
//!
//! # Example
//!
//! ```no_run
//! use workshop_core::resolver::{LinkResolver, WorkshopResolver, DEFAULT_LOOKUP_URL};
//! use workshop_core::HttpTimeouts;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = WorkshopResolver::new(DEFAULT_LOOKUP_URL, HttpTimeouts::none())?;
//! let target = resolver
//!     .resolve("https://steamcommunity.com/sharedfiles/filedetails/?id=2721562982", 636480)
//!     .await?;
//! println!("Resolved: {target}");
//! # Ok(())
//! # }
//! ```

mod error;
mod workshop;

pub use error::ResolveError;
pub use workshop::{
    DEFAULT_LOOKUP_URL, LookupPattern, WORKSHOP_ADDRESS_PATTERN, WorkshopResolver, extract_item_id,
};

use async_trait::async_trait;

/// Resolution state of a single item reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStatus {
    /// A direct download address was found.
    Resolved {
        /// The direct download address.
        target: String,
    },
    /// Resolution failed; the item will not be downloaded.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

/// The terminal outcome of resolving one item reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// The item reference that was resolved.
    pub source: String,
    /// Resolution outcome.
    pub status: ResolveStatus,
}

impl ResolvedLink {
    /// Creates a successfully resolved link.
    #[must_use]
    pub fn resolved(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            status: ResolveStatus::Resolved {
                target: target.into(),
            },
        }
    }

    /// Creates a failed link from the resolution error.
    #[must_use]
    pub fn failed(source: impl Into<String>, error: &ResolveError) -> Self {
        Self {
            source: source.into(),
            status: ResolveStatus::Failed {
                reason: error.to_string(),
            },
        }
    }

    /// Returns the download address when resolution succeeded.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match &self.status {
            ResolveStatus::Resolved { target } => Some(target),
            ResolveStatus::Failed { .. } => None,
        }
    }

    /// Returns true if resolution succeeded.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, ResolveStatus::Resolved { .. })
    }
}

/// Trait that all resolvers must implement.
///
/// Each call is independent: one item's failure never affects another's,
/// and implementations make a single attempt without retrying.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Arc<dyn LinkResolver>`, which the pipeline shares across pool tasks.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Returns the resolver's name for logging.
    fn name(&self) -> &str;

    /// Resolves an item reference for the given application into a download address.
    async fn resolve(&self, reference: &str, app_id: u32) -> Result<String, ResolveError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_link_resolved_exposes_target() {
        let link = ResolvedLink::resolved("http://x/?id=1", "http://workshop1.abcvg.info/archive/1/1.zip");
        assert!(link.is_resolved());
        assert_eq!(
            link.target(),
            Some("http://workshop1.abcvg.info/archive/1/1.zip")
        );
        assert_eq!(link.source, "http://x/?id=1");
    }

    #[test]
    fn test_resolved_link_failed_keeps_reason() {
        let error = ResolveError::missing_identifier("http://x/");
        let link = ResolvedLink::failed("http://x/", &error);
        assert!(!link.is_resolved());
        assert!(link.target().is_none());
        match link.status {
            ResolveStatus::Failed { reason } => assert!(reason.contains("`id`"), "{reason}"),
            ResolveStatus::Resolved { .. } => panic!("expected Failed"),
        }
    }
}
