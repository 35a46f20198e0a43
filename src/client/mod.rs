//! Client for the upstream paginated region catalog.
//!
//! This module retrieves the complete region catalog and returns it as a
//! single [`Catalog`](crate::catalog::Catalog), or an error and nothing else.
//!
//! # Features
//!
//! - Per-request `EAN` signature from an API key pair and an injected [`Clock`]
//! - Cursor pagination through the `Link` response header
//! - One retry budget (5 by default) shared by the whole traversal
//! - Transparent `Content-Encoding: gzip` bodies
//!
//! # Example
//!
//! ```no_run
//! use region_cache_core::client::{ClientConfig, HttpRegionClient, RegionClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = reqwest::Client::builder().no_gzip().build()?;
//! let config = ClientConfig::new("https://test.ean.com/2.2", "api-key", "secret");
//! let client = HttpRegionClient::new(http, config);
//! let catalog = client.fetch_all_regions().await?;
//! println!("fetched {} regions", catalog.len());
//! # Ok(())
//! # }
//! ```

pub mod decode;
mod error;
mod fetcher;
pub mod pagination;
pub mod request;
mod retry;
pub mod signer;

pub use error::{DecodeError, FailureType, FetchError};
pub use fetcher::{ClientConfig, HttpRegionClient, RegionClient};
pub use request::RequestBuilder;
pub use retry::{DEFAULT_MAX_RETRIES, RetryBudget, RetryDecision};
pub use signer::{Clock, FixedClock, Signer, SystemClock};
