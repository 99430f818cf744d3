//! External store interfaces.
//!
//! All shared mutable state lives outside the process: subscriber records in
//! a record store with unique-constraint semantics, and rate-limit counters
//! in a TTL-expiring counter store. The handler depends only on these traits;
//! concrete backends live in [`memory`] and [`rest`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod rest;

pub use memory::{MemoryCounterStore, MemorySubscriberStore};
pub use rest::{RestCounterStore, RestSubscriberStore};

/// Errors that can occur talking to an external store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// Authentication/authorization error
    #[error("authentication error: {0}")]
    Auth(String),
    /// Unique-constraint violation on insert
    #[error("duplicate key: {0}")]
    Duplicate(String),
    /// Any other backend failure
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this error is a benign duplicate-key violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate(_))
    }
}

/// A subscriber record. Existence is the sole subscription signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub phone_number: String,
}

/// Record store keyed by phone number with unique-constraint semantics.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Look up a subscriber by phone number, returning zero-or-one record.
    async fn find(&self, phone_number: &str) -> Result<Option<Subscriber>, StoreError>;

    /// Insert a new subscriber. A concurrent insert for the same number must
    /// surface as [`StoreError::Duplicate`], distinguishable from other
    /// failures.
    async fn insert(&self, phone_number: &str) -> Result<Subscriber, StoreError>;
}

/// TTL-expiring counter store used for rate limiting.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the current counter value; `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError>;

    /// Write a counter value with a fresh time-to-live.
    async fn put_with_ttl(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError>;
}
