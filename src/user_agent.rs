//! User-Agent string sent with every upstream request.

/// Client identifier for upstream requests (`region-cache/<version>`).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("region-cache/{version}")
}
