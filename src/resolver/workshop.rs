//! Lookup-service resolver for workshop item references.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};

use super::{LinkResolver, ResolveError};

/// Lookup endpoint queried when no override is configured.
pub const DEFAULT_LOOKUP_URL: &str = "http://steamworkshop.download/online/steamonline.php";

/// Shape of a direct archive address embedded in lookup responses.
///
/// The separator between the two numeric path parts is either `.` or `/`;
/// the service has emitted both forms.
pub const WORKSHOP_ADDRESS_PATTERN: &str =
    r"http://workshop\d+\.abcvg\.info/archive/\d+[./]\d+\.zip";

/// Query parameter carrying the item identifier in a reference URL.
const ITEM_ID_PARAM: &str = "id";

/// Compiled download address pattern.
///
/// Built once when the resolver is constructed and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct LookupPattern {
    regex: Regex,
}

impl LookupPattern {
    /// Compiles a custom address pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, ResolveError> {
        let regex = Regex::new(pattern).map_err(|source| ResolveError::InvalidPattern { source })?;
        Ok(Self { regex })
    }

    /// Compiles [`WORKSHOP_ADDRESS_PATTERN`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidPattern`] if the pattern does not compile.
    pub fn workshop() -> Result<Self, ResolveError> {
        Self::new(WORKSHOP_ADDRESS_PATTERN)
    }

    /// Returns the first address in `body` matching the pattern.
    #[must_use]
    pub fn find<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.regex.find(body).map(|m| m.as_str())
    }
}

/// Resolver backed by the workshop lookup service.
///
/// Sends a form-encoded POST with the item identifier and application
/// identifier, then scans the reply for a direct archive address.
#[derive(Debug, Clone)]
pub struct WorkshopResolver {
    client: Client,
    lookup_url: String,
    pattern: LookupPattern,
}

impl WorkshopResolver {
    /// Creates a resolver for `lookup_url` with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Client`] if the HTTP client cannot be built, or
    /// [`ResolveError::InvalidPattern`] if the address pattern does not compile.
    pub fn new(lookup_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, ResolveError> {
        let client =
            build_http_client(timeouts).map_err(|source| ResolveError::Client { source })?;
        Ok(Self::with_client(client, lookup_url, LookupPattern::workshop()?))
    }

    /// Creates a resolver from an existing client and pattern.
    #[must_use]
    pub fn with_client(client: Client, lookup_url: impl Into<String>, pattern: LookupPattern) -> Self {
        Self {
            client,
            lookup_url: lookup_url.into(),
            pattern,
        }
    }

    /// Returns the lookup endpoint this resolver posts to.
    #[must_use]
    pub fn lookup_url(&self) -> &str {
        &self.lookup_url
    }
}

#[async_trait]
impl LinkResolver for WorkshopResolver {
    fn name(&self) -> &'static str {
        "workshop"
    }

    #[instrument(skip(self), fields(resolver = "workshop"))]
    async fn resolve(&self, reference: &str, app_id: u32) -> Result<String, ResolveError> {
        let item_id = extract_item_id(reference)?;
        let app = app_id.to_string();

        debug!(item_id = %item_id, lookup_url = %self.lookup_url, "querying lookup service");

        let response = self
            .client
            .post(&self.lookup_url)
            .form(&[("item", item_id.as_str()), ("app", app.as_str())])
            .send()
            .await
            .map_err(|e| ResolveError::lookup(item_id.clone(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::lookup(item_id.clone(), e))?;

        // The service's status code is not trusted either way; only the body decides.
        match self.pattern.find(&body) {
            Some(address) => {
                debug!(item_id = %item_id, address, "lookup matched download address");
                Ok(address.to_string())
            }
            None => {
                debug!(
                    item_id = %item_id,
                    status = status.as_u16(),
                    body_len = body.len(),
                    "lookup response has no download address"
                );
                Err(ResolveError::no_match(item_id))
            }
        }
    }
}

/// Extracts the item identifier from a reference's `id` query parameter.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedReference`] if the reference is not a URL,
/// or [`ResolveError::MissingIdentifier`] if `id` is absent or empty.
pub fn extract_item_id(reference: &str) -> Result<String, ResolveError> {
    let parsed =
        Url::parse(reference).map_err(|e| ResolveError::malformed_reference(reference, e))?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == ITEM_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ResolveError::missing_identifier(reference))
}
