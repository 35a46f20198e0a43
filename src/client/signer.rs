//! Time-bound `Authorization` credentials for the upstream API.
//!
//! The signature is `hex(SHA-512(api_key || secret_key || timestamp))` and the
//! header value is `EAN apikey=<key>,signature=<hex>,timestamp=<secs>`.
//! A fresh value is computed for every outbound request.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha512};

/// Source of the current time in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn unix_timestamp(&self) -> u64;
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        // A clock set before 1970 signs with 0 and lets upstream reject it.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// Clock frozen at a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> u64 {
        self.0
    }
}

/// Computes the lowercase hex SHA-512 signature for a timestamp.
#[must_use]
pub fn sign(api_key: &str, secret_key: &str, timestamp: u64) -> String {
    let mut hasher = Sha512::new();
    hasher.update(api_key.as_bytes());
    hasher.update(secret_key.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Formats the full `Authorization` header value.
#[must_use]
pub fn authorization_value(api_key: &str, secret_key: &str, timestamp: u64) -> String {
    let signature = sign(api_key, secret_key, timestamp);
    format!("EAN apikey={api_key},signature={signature},timestamp={timestamp}")
}

/// Signs requests with an API key pair and an injected clock.
#[derive(Clone)]
pub struct Signer {
    api_key: String,
    secret_key: String,
    clock: Arc<dyn Clock>,
}

impl Signer {
    /// Creates a signer reading time from `clock`.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            clock,
        }
    }

    /// Creates a signer using the system wall clock.
    pub fn with_system_clock(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::new(api_key, secret_key, Arc::new(SystemClock))
    }

    /// Returns an `Authorization` header value stamped with the current time.
    #[must_use]
    pub fn authorization(&self) -> String {
        authorization_value(
            &self.api_key,
            &self.secret_key,
            self.clock.unix_timestamp(),
        )
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
