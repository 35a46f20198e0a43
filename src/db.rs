//! SQLite pool backing the region cache.
//!
//! File databases are opened in WAL mode with a busy timeout set on every
//! pooled connection. Migrations under `migrations/` run on open.
//!
//! ```no_run
//! use region_cache_core::{Database, RegionStore};
//! use std::path::Path;
//!
//! # async fn open() -> Result<(), Box<dyn std::error::Error>> {
//! let _store = RegionStore::new(Database::new(Path::new("regions.db")).await?);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, instrument};

/// Pool size for file databases; writes are serialized by SQLite anyway.
const FILE_POOL_SIZE: u32 = 4;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors opening the cache database.
#[derive(Error, Debug)]
pub enum DbError {
    /// The database could not be opened.
    #[error("cannot open region database: {0}")]
    Connection(#[from] sqlx::Error),

    /// The schema could not be brought up to date.
    #[error("cannot migrate region database: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Handle to the region cache database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the cache at `db_path`, creating the file if it is missing.
    ///
    /// # Errors
    ///
    /// [`DbError::Connection`] when the file cannot be opened,
    /// [`DbError::Migration`] when the schema cannot be applied.
    #[instrument(skip(db_path), fields(path = %db_path.display()))]
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let db = Self::open(options, FILE_POOL_SIZE).await?;
        debug!("region database ready");
        Ok(db)
    }

    /// Opens a private in-memory cache.
    ///
    /// The pool holds one connection; each new connection would see a fresh
    /// empty database.
    ///
    /// # Errors
    ///
    /// Same as [`Database::new`].
    pub async fn new_in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::open(options, 1).await
    }

    async fn open(options: SqliteConnectOptions, max_connections: u32) -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Underlying pool, for queries.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for open connections to finish and closes the pool.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_has_regions_table() {
        let db = Database::new_in_memory().await.unwrap();

        let inserted = sqlx::query("INSERT INTO regions (id, name, data) VALUES ('1', 'one', '{}')")
            .execute(db.pool())
            .await;

        assert!(inserted.is_ok(), "regions table missing: {inserted:?}");
    }

    #[tokio::test]
    async fn test_region_id_is_primary_key() {
        let db = Database::new_in_memory().await.unwrap();
        let insert = "INSERT INTO regions (id, name, data) VALUES ('1', 'one', '{}')";

        sqlx::query(insert).execute(db.pool()).await.unwrap();
        let duplicate = sqlx::query(insert).execute(db.pool()).await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_file_database_uses_wal_on_every_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("regions.db")).await.unwrap();

        // Hold one connection so the pool has to hand out a second.
        let mut held = db.pool().acquire().await.unwrap();
        let (journal_mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&mut *held)
            .await
            .unwrap();

        let (held_timeout,): (i64,) = sqlx::query_as("PRAGMA busy_timeout")
            .fetch_one(&mut *held)
            .await
            .unwrap();
        let (other_timeout,): (i64,) = sqlx::query_as("PRAGMA busy_timeout")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert!(journal_mode.eq_ignore_ascii_case("wal"));
        assert_eq!(held_timeout, 5000);
        assert_eq!(other_timeout, 5000);

        drop(held);
        db.close().await;
    }

    #[tokio::test]
    async fn test_file_path_with_url_characters_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache?mode=ro#1.db");

        let db = Database::new(&path).await.unwrap();
        db.close().await;

        assert!(path.exists(), "expected database at {}", path.display());
    }
}
