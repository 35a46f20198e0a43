//! Region cache service: refresh the cache from upstream, search it by name.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::catalog::Region;
use crate::client::{FetchError, RegionClient};
use crate::store::{RegionRepository, StoreError};

/// Errors surfaced by [`RegionService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Fetching the upstream catalog failed; the cache was not touched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading or writing the cache failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No cached region has the requested name.
    #[error("region not found: {name}")]
    NotFound {
        /// The name searched for.
        name: String,
    },
}

/// Coordinates the upstream client and the region cache.
pub struct RegionService {
    client: Arc<dyn RegionClient>,
    repository: Arc<dyn RegionRepository>,
    update_lock: Mutex<()>,
}

impl RegionService {
    /// Creates a service over `client` and `repository`.
    pub fn new(client: Arc<dyn RegionClient>, repository: Arc<dyn RegionRepository>) -> Self {
        Self {
            client,
            repository,
            update_lock: Mutex::new(()),
        }
    }

    /// Fetches the full catalog and replaces the cache with it.
    ///
    /// Concurrent calls run one after another. Returns the number of regions
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Fetch`] if the catalog could not be fetched, in
    /// which case the cache is unchanged, or [`ServiceError::Store`] if
    /// persisting failed.
    #[instrument(skip(self))]
    pub async fn update(&self) -> Result<usize, ServiceError> {
        let _guard = self.update_lock.lock().await;

        let catalog = self.client.fetch_all_regions().await?;
        self.repository.replace_all(&catalog).await?;

        info!(regions = catalog.len(), "region cache updated");
        Ok(catalog.len())
    }

    /// Finds a cached region by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when no region matches, or
    /// [`ServiceError::Store`] if the lookup failed.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Region, ServiceError> {
        self.repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                name: name.to_string(),
            })
    }
}
