//! Paginated, retrying catalog fetch.
//!
//! [`HttpRegionClient`] walks the catalog from `<base_url>/regions`, following
//! `Link` continuations one request at a time until a page without a next
//! link arrives. Transient failures are retried against the same URL from a
//! budget shared by the whole walk; any fatal failure discards everything
//! accumulated so far.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::decode::{ContentEncoding, decode_into};
use super::error::FetchError;
use super::pagination::{link_header, next_page};
use super::request::RequestBuilder;
use super::retry::{DEFAULT_MAX_RETRIES, RetryBudget, RetryDecision};
use super::signer::{Clock, Signer, SystemClock};
use crate::catalog::Catalog;

/// Source of a complete region catalog.
#[async_trait]
pub trait RegionClient: Send + Sync {
    /// Fetches every page of the catalog, or nothing.
    async fn fetch_all_regions(&self) -> Result<Catalog, FetchError>;
}

/// Upstream API location and credentials.
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://test.ean.com/2.2`.
    pub base_url: String,
    /// Public API key.
    pub api_key: String,
    /// Shared secret used only for signing.
    pub secret_key: String,
    /// Optional `Customer-Ip` header value.
    pub customer_ip: Option<String>,
}

impl ClientConfig {
    /// Creates a config without a customer IP.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            customer_ip: None,
        }
    }

    /// Root listing endpoint.
    #[must_use]
    pub fn regions_url(&self) -> String {
        format!("{}/regions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("customer_ip", &self.customer_ip)
            .finish()
    }
}

/// Response parts needed after the status check.
struct RawPage {
    encoding: ContentEncoding,
    link: Option<String>,
    body: Bytes,
}

/// Network-backed [`RegionClient`].
///
/// Timeouts come from the supplied [`reqwest::Client`]. The client must not
/// decompress bodies itself (build it with `no_gzip()`), otherwise the
/// `Content-Encoding` header never reaches the decoder.
#[derive(Debug, Clone)]
pub struct HttpRegionClient {
    http: Client,
    start_url: String,
    requests: RequestBuilder,
    max_retries: u32,
}

impl HttpRegionClient {
    /// Creates a client signing with the system clock.
    #[must_use]
    pub fn new(http: Client, config: ClientConfig) -> Self {
        Self::with_clock(http, config, Arc::new(SystemClock))
    }

    /// Creates a client signing with `clock`.
    #[must_use]
    pub fn with_clock(http: Client, config: ClientConfig, clock: Arc<dyn Clock>) -> Self {
        let start_url = config.regions_url();
        let signer = Signer::new(config.api_key, config.secret_key, clock);
        let requests = RequestBuilder::new(signer).with_customer_ip(config.customer_ip);
        Self {
            http,
            start_url,
            requests,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Overrides the traversal-wide retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The URL the walk starts from.
    #[must_use]
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    /// Walks the catalog starting at `start`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RetriesExhausted`] once transient failures exceed the budget
    /// - [`FetchError::MalformedTarget`] for an unusable start or `Link` URL
    /// - [`FetchError::Decode`] for a corrupt gzip body or mismatched JSON
    /// - [`FetchError::InvalidHeader`] when credentials cannot be sent as headers
    #[instrument(skip(self))]
    pub async fn fetch_from(&self, start: &str) -> Result<Catalog, FetchError> {
        let mut catalog = Catalog::new();
        let mut budget = RetryBudget::new(self.max_retries);
        let mut target = start.to_string();
        let mut pages = 0_usize;

        loop {
            let page = match self.fetch_page(&target).await {
                Ok(page) => page,
                Err(error) => match budget.on_failure(&target, error) {
                    RetryDecision::Retry { remaining } => {
                        warn!(url = %target, remaining, "transient failure, retrying");
                        continue;
                    }
                    RetryDecision::Fail(error) => return Err(error),
                },
            };

            let count = decode_into(page.encoding, &page.body, &mut catalog)
                .map_err(|e| FetchError::decode(&target, e))?;
            pages += 1;
            debug!(url = %target, page = pages, regions = count, "page decoded");

            match next_page(page.link.as_deref())? {
                Some(next) => target = next.into(),
                None => break,
            }
        }

        info!(
            pages,
            regions = catalog.len(),
            retries = budget.spent(),
            "catalog fetched"
        );
        Ok(catalog)
    }

    async fn fetch_page(&self, target: &str) -> Result<RawPage, FetchError> {
        let request = self.requests.build(target)?;
        debug!(url = %request.url(), "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| FetchError::network(target, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(target, status.as_u16()));
        }

        let encoding = ContentEncoding::from_headers(response.headers());
        let link = link_header(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(target, e))?;

        Ok(RawPage {
            encoding,
            link,
            body,
        })
    }
}

#[async_trait]
impl RegionClient for HttpRegionClient {
    async fn fetch_all_regions(&self) -> Result<Catalog, FetchError> {
        self.fetch_from(&self.start_url).await
    }
}
