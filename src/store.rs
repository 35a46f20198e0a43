//! Persistence of the fetched region catalog.
//!
//! The cache is replaced wholesale: [`RegionRepository::replace_all`] deletes
//! every row and inserts the new catalog inside one transaction, so readers
//! see either the old catalog or the new one.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::catalog::{Catalog, Region};
use crate::db::Database;

/// Errors from the region store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or transaction failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Region could not be converted to or from its stored JSON.
    #[error("region serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Data-access contract for the region cache.
#[async_trait]
pub trait RegionRepository: Send + Sync {
    /// Replaces the stored catalog with `catalog`.
    async fn replace_all(&self, catalog: &Catalog) -> Result<(), StoreError>;

    /// Looks up a region by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Region>, StoreError>;
}

/// SQLite-backed [`RegionRepository`].
#[derive(Debug, Clone)]
pub struct RegionStore {
    db: Database,
}

impl RegionStore {
    /// Wraps an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Number of cached regions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM regions")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RegionRepository for RegionStore {
    #[instrument(skip(self, catalog), fields(regions = catalog.len()))]
    async fn replace_all(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let mut tx = self.db.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM regions")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!(deleted, "cleared cached regions");

        // Rows are keyed by catalog id so the primary key matches catalog uniqueness.
        for (id, region) in catalog {
            let data = serde_json::to_string(region)?;
            sqlx::query("INSERT INTO regions (id, name, data) VALUES (?, ?, ?)")
                .bind(id)
                .bind(&region.name)
                .bind(data)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(inserted = catalog.len(), "region cache replaced");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Region>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT data FROM regions WHERE name = ? ORDER BY id LIMIT 1")
                .bind(name)
                .fetch_optional(self.db.pool())
                .await?;

        row.map(|(data,)| serde_json::from_str::<Region>(&data))
            .transpose()
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::Ancestor;

    fn region(id: &str, name: &str) -> Region {
        Region {
            id: id.to_string(),
            kind: "city".to_string(),
            name: name.to_string(),
            descriptor: format!("test region {id}"),
            ..Region::default()
        }
    }

    async fn store() -> RegionStore {
        RegionStore::new(Database::new_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_replace_all_then_find_by_name() {
        let store = store().await;
        let mut first = region("1", "first");
        first.ancestors = vec![Ancestor {
            id: "9".to_string(),
            kind: "country".to_string(),
        }];
        first.descendants = HashMap::from([("neighborhood".to_string(), vec!["7".to_string()])]);
        let catalog: Catalog = [first.clone(), region("2", "second")].into_iter().collect();

        store.replace_all(&catalog).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.find_by_name("first").await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_replace_all_removes_previous_rows() {
        let store = store().await;
        store
            .replace_all(&[region("1", "old")].into_iter().collect())
            .await
            .unwrap();

        store
            .replace_all(&[region("2", "new")].into_iter().collect())
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_name("old").await.unwrap().is_none());
        assert!(store.find_by_name("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_by_name_missing_returns_none() {
        let store = store().await;
        assert!(store.find_by_name("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_corrupt_row_is_serialization_error() {
        let store = store().await;
        sqlx::query("INSERT INTO regions (id, name, data) VALUES ('1', 'test', '{\"id\": ')")
            .execute(store.db.pool())
            .await
            .unwrap();

        let result = store.find_by_name("test").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_replace_all_with_empty_catalog_clears_cache() {
        let store = store().await;
        store
            .replace_all(&[region("1", "first")].into_iter().collect())
            .await
            .unwrap();

        store.replace_all(&Catalog::new()).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
