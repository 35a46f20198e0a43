//! `Link` header cursor extraction.
//!
//! Upstream advertises the next page as `Link: <https://...>; rel="next"`.
//! The header text is split on `;`, `<`, `>` and `"`; the first non-empty
//! token is the next page URL. An absent or blank header ends the walk.

use reqwest::header::{HeaderMap, LINK};
use url::Url;

use super::error::FetchError;
use super::request::catalog_url;

/// Returns the raw `Link` header text, if any.
#[must_use]
pub fn link_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LINK)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Extracts the first URL token from a `Link` header value.
#[must_use]
pub fn next_link(link: &str) -> Option<&str> {
    link.split([';', '<', '>', '"'])
        .map(str::trim)
        .find(|token| !token.is_empty())
}

/// Resolves the next page target from a `Link` header value.
///
/// Returns `Ok(None)` when there is no further page.
///
/// # Errors
///
/// Returns [`FetchError::MalformedTarget`] when the extracted token is not
/// an absolute http(s) URL.
pub fn next_page(link: Option<&str>) -> Result<Option<Url>, FetchError> {
    link.and_then(next_link).map(catalog_url).transpose()
}
