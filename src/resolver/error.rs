//! Error types for resolver operations.

use thiserror::Error;

/// Errors that can occur while resolving one item reference.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The reference could not be parsed as a URL.
    #[error("malformed item reference '{reference}': {source}")]
    MalformedReference {
        /// The reference as given.
        reference: String,
        /// The underlying URL parse error.
        #[source]
        source: url::ParseError,
    },

    /// The reference has no (or an empty) `id` query parameter.
    #[error("item reference '{reference}' has no `id` query parameter")]
    MissingIdentifier {
        /// The reference as given.
        reference: String,
    },

    /// The lookup request failed at the transport level.
    #[error("lookup request for item {item_id} failed: {source}")]
    Lookup {
        /// The item identifier that was looked up.
        item_id: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The lookup response did not contain a download address.
    #[error("lookup service returned no download address for item {item_id}")]
    NoMatch {
        /// The item identifier that was looked up.
        item_id: String,
    },

    /// The download address pattern failed to compile.
    #[error("invalid download address pattern: {source}")]
    InvalidPattern {
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The resolver's HTTP client could not be built.
    #[error("failed to build resolver HTTP client: {source}")]
    Client {
        /// The underlying client builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ResolveError {
    /// Creates a malformed reference error.
    pub fn malformed_reference(reference: impl Into<String>, source: url::ParseError) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
            source,
        }
    }

    /// Creates a missing identifier error.
    pub fn missing_identifier(reference: impl Into<String>) -> Self {
        Self::MissingIdentifier {
            reference: reference.into(),
        }
    }

    /// Creates a lookup transport error.
    pub fn lookup(item_id: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Lookup {
            item_id: item_id.into(),
            source,
        }
    }

    /// Creates a no-match error.
    pub fn no_match(item_id: impl Into<String>) -> Self {
        Self::NoMatch {
            item_id: item_id.into(),
        }
    }

    /// Returns true for failures reported by (or while talking to) the lookup service.
    #[must_use]
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::Lookup { .. } | Self::NoMatch { .. })
    }
}
