//! Outbound request construction.
//!
//! Every request to the catalog API is a signed `GET` carrying the same
//! header set and the same `language`/`include` query parameters, whether it
//! targets the root listing or a `Link` continuation.

use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use reqwest::{Method, Request};
use url::Url;

use super::error::FetchError;
use super::signer::Signer;
use crate::user_agent;

/// Response language requested from upstream.
pub const LANGUAGE: &str = "en-US";

/// Values of the repeated `include` query parameter, in request order.
pub const INCLUDE: [&str; 3] = ["details", "property_ids", "property_ids_expanded"];

const CUSTOMER_IP: HeaderName = HeaderName::from_static("customer-ip");

/// Builds signed catalog requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    signer: Signer,
    user_agent: String,
    customer_ip: Option<String>,
}

impl RequestBuilder {
    /// Creates a builder that signs with `signer` and sends the default User-Agent.
    #[must_use]
    pub fn new(signer: Signer) -> Self {
        Self {
            signer,
            user_agent: user_agent::default_user_agent(),
            customer_ip: None,
        }
    }

    /// Adds a `Customer-Ip` header to every request.
    #[must_use]
    pub fn with_customer_ip(mut self, customer_ip: Option<String>) -> Self {
        self.customer_ip = customer_ip;
        self
    }

    /// Builds a signed `GET` request for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MalformedTarget`] if `target` is not an absolute
    /// http(s) URL, or [`FetchError::InvalidHeader`] if a configured value
    /// cannot be sent as a header.
    pub fn build(&self, target: &str) -> Result<Request, FetchError> {
        let url = catalog_url(target)?;
        let mut request = Request::new(Method::GET, url);
        *request.headers_mut() = self.headers()?;
        Ok(request)
    }

    fn headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(USER_AGENT, header_value("User-Agent", &self.user_agent)?);
        if let Some(customer_ip) = &self.customer_ip {
            headers.insert(CUSTOMER_IP, header_value("Customer-Ip", customer_ip)?);
        }
        headers.insert(
            AUTHORIZATION,
            header_value("Authorization", &self.signer.authorization())?,
        );
        Ok(headers)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::invalid_header(name, e))
}

/// Parses `target` and replaces its `language`/`include` parameters with the
/// canonical set. Other query pairs are kept in order.
///
/// # Errors
///
/// Returns [`FetchError::MalformedTarget`] for relative URLs, unparsable text,
/// or schemes other than http and https.
pub fn catalog_url(target: &str) -> Result<Url, FetchError> {
    let mut url =
        Url::parse(target).map_err(|e| FetchError::malformed_target(target, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::malformed_target(
            target,
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "language" && key != "include")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("language", LANGUAGE)
        .extend_pairs(INCLUDE.iter().map(|value| ("include", *value)));

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::signer::FixedClock;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(Signer::new("abc", "secret", Arc::new(FixedClock(1_559_215_747))))
    }

    fn include_values(url: &Url) -> Vec<String> {
        url.query_pairs()
            .filter(|(key, _)| key == "include")
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    #[test]
    fn test_build_sets_catalog_headers() {
        let request = builder().build("https://api.test/2.2/regions").unwrap();
        let headers = request.headers();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[ACCEPT_ENCODING], "gzip");
        assert_eq!(
            headers[USER_AGENT],
            format!("region-cache/{}", env!("CARGO_PKG_VERSION")).as_str()
        );
        assert!(
            headers[AUTHORIZATION]
                .to_str()
                .unwrap()
                .starts_with("EAN apikey=abc,signature=8333ffbf"),
        );
        assert!(headers.get(CUSTOMER_IP).is_none());
    }

    #[test]
    fn test_build_sets_query_parameters_in_order() {
        let request = builder().build("https://api.test/2.2/regions").unwrap();
        let url = request.url();

        assert_eq!(url.path(), "/2.2/regions");
        assert_eq!(
            url.query(),
            Some("language=en-US&include=details&include=property_ids&include=property_ids_expanded")
        );
    }

    #[test]
    fn test_continuation_url_keeps_token_and_normalizes_include() {
        let url = catalog_url(
            "https://api.test/2.2/regions?token=ABC&include=details&language=fr-FR",
        )
        .unwrap();

        assert_eq!(
            include_values(&url),
            vec!["details", "property_ids", "property_ids_expanded"]
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("token".to_string(), "ABC".to_string()));
        assert_eq!(pairs[1], ("language".to_string(), "en-US".to_string()));
    }

    #[test]
    fn test_customer_ip_header_when_configured() {
        let request = builder()
            .with_customer_ip(Some("10.132.20.37".to_string()))
            .build("https://api.test/regions")
            .unwrap();
        assert_eq!(request.headers()[CUSTOMER_IP], "10.132.20.37");
    }

    #[test]
    fn test_build_rejects_relative_target() {
        let result = builder().build("/regions");
        assert!(
            matches!(result, Err(FetchError::MalformedTarget { ref url, .. }) if url == "/regions"),
            "expected MalformedTarget, got {result:?}"
        );
    }

    #[test]
    fn test_build_rejects_non_http_scheme() {
        let result = builder().build("localhost:8080/regions");
        assert!(matches!(result, Err(FetchError::MalformedTarget { .. })));
    }

    #[test]
    fn test_build_rejects_unencodable_api_key() {
        let signer = Signer::new("bad\nkey", "secret", Arc::new(FixedClock(1)));
        let result = RequestBuilder::new(signer).build("https://api.test/regions");
        assert!(matches!(
            result,
            Err(FetchError::InvalidHeader {
                name: "Authorization",
                ..
            })
        ));
    }
}
