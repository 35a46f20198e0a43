//! Retry budget shared across one catalog traversal.
//!
//! The budget is not reset between pages: five transient failures anywhere in
//! the walk are tolerated, the sixth ends it.

use tracing::debug;

use super::error::{FailureType, FetchError};

/// Default number of retries for a whole traversal.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Decision after a failed attempt.
#[derive(Debug)]
pub enum RetryDecision {
    /// Try the same URL again.
    Retry {
        /// Retries left after this one.
        remaining: u32,
    },
    /// Stop the traversal with this error.
    Fail(FetchError),
}

/// Countdown of retries left for a traversal.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    max_retries: u32,
    remaining: u32,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryBudget {
    /// Creates a budget of `max_retries` retries.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            remaining: max_retries,
        }
    }

    /// Retries left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Retries spent so far.
    #[must_use]
    pub fn spent(&self) -> u32 {
        self.max_retries - self.remaining
    }

    /// Consumes one retry for a transient `error`, or converts it into the
    /// terminal error for fatal failures and an empty budget.
    pub fn on_failure(&mut self, url: &str, error: FetchError) -> RetryDecision {
        match error.failure_type() {
            FailureType::Fatal => RetryDecision::Fail(error),
            FailureType::Transient if self.remaining == 0 => {
                debug!(url, retries = self.max_retries, "retry budget exhausted");
                RetryDecision::Fail(FetchError::retries_exhausted(url, self.max_retries, error))
            }
            FailureType::Transient => {
                self.remaining -= 1;
                RetryDecision::Retry {
                    remaining: self.remaining,
                }
            }
        }
    }
}
