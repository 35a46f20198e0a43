//! Error types for the region client.
//!
//! Every variant carries the URL it concerns so a failed traversal can be
//! traced back to the page that broke it.

use thiserror::Error;

/// Failures while turning a response body into a catalog page.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body declared `Content-Encoding: gzip` but is not a valid gzip stream.
    #[error("invalid gzip body: {0}")]
    Gzip(#[source] std::io::Error),

    /// JSON does not match the expected catalog shape.
    #[error("{0}")]
    Json(#[source] serde_json::Error),
}

/// Errors that can occur while fetching the region catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, body read failure, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The shared retry budget ran out on a transient failure.
    #[error("giving up on {url} after {retries} retries: {last}")]
    RetriesExhausted {
        /// The URL being fetched when the budget ran out.
        url: String,
        /// Number of retries spent over the whole traversal.
        retries: u32,
        /// The final transient failure.
        #[source]
        last: Box<FetchError>,
    },

    /// A request target (base URL or `Link` continuation) is not an absolute URL.
    #[error("malformed target URL {url:?}: {reason}")]
    MalformedTarget {
        /// The offending URL text.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// A header value could not be encoded (e.g. a control character in the API key).
    #[error("invalid {name} header value: {source}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
        /// The encoding failure.
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// A response body could not be decoded.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The decoding failure.
        #[source]
        source: DecodeError,
    },
}

/// Whether a failure is worth another attempt against the same URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Connection failures and non-success statuses.
    Transient,
    /// Malformed targets, bad header values, decode failures, exhausted retries.
    Fatal,
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Wraps the last transient failure once the retry budget is spent.
    pub fn retries_exhausted(url: impl Into<String>, retries: u32, last: FetchError) -> Self {
        Self::RetriesExhausted {
            url: url.into(),
            retries,
            last: Box::new(last),
        }
    }

    /// Creates a malformed target error.
    pub fn malformed_target(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTarget {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(
        name: &'static str,
        source: reqwest::header::InvalidHeaderValue,
    ) -> Self {
        Self::InvalidHeader { name, source }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: DecodeError) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Classifies this error for the retry loop.
    #[must_use]
    pub fn failure_type(&self) -> FailureType {
        match self {
            Self::Network { .. } | Self::HttpStatus { .. } => FailureType::Transient,
            Self::RetriesExhausted { .. }
            | Self::MalformedTarget { .. }
            | Self::InvalidHeader { .. }
            | Self::Decode { .. } => FailureType::Fatal,
        }
    }
}
