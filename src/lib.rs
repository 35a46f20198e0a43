//! Region Cache Core Library
//!
//! Fetches the complete region catalog from the upstream paginated API,
//! caches it in SQLite and serves name lookups over HTTP.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Region data model and the accumulated catalog
//! - [`client`] - Signed, paginated, retrying upstream fetch
//! - [`db`] - Database connection and schema management
//! - [`store`] - Region cache persistence
//! - [`service`] - Update and search operations over client and store
//! - [`server`] - HTTP routes for search and update

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod client;
pub mod db;
pub mod server;
pub mod service;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Ancestor, Catalog, Region};
pub use client::{
    ClientConfig, DEFAULT_MAX_RETRIES, FetchError, HttpRegionClient, RegionClient,
};
pub use db::{Database, DbError};
pub use service::{RegionService, ServiceError};
pub use store::{RegionRepository, RegionStore, StoreError};
