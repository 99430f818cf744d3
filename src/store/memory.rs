//! In-process store backends.
//!
//! Used by tests and local development. The counter store enforces expiry on
//! read; entries are treated as absent once their deadline passes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CounterStore, StoreError, Subscriber, SubscriberStore};

/// In-memory subscriber store backed by a phone-number set.
#[derive(Debug, Default)]
pub struct MemorySubscriberStore {
    records: RwLock<HashMap<String, Subscriber>>,
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn find(&self, phone_number: &str) -> Result<Option<Subscriber>, StoreError> {
        Ok(self.records.read().await.get(phone_number).cloned())
    }

    async fn insert(&self, phone_number: &str) -> Result<Subscriber, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(phone_number) {
            return Err(StoreError::Duplicate(phone_number.to_string()));
        }
        let subscriber = Subscriber {
            phone_number: phone_number.to_string(),
        };
        records.insert(phone_number.to_string(), subscriber.clone());
        Ok(subscriber)
    }
}

#[derive(Debug)]
struct CounterEntry {
    value: u64,
    expires_at: Instant,
}

/// In-memory TTL counter store.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: RwLock<HashMap<String, CounterEntry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let counters = self.counters.read().await;
        Ok(counters
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value))
    }

    async fn put_with_ttl(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError> {
        let mut counters = self.counters.write().await;
        counters.insert(
            key.to_string(),
            CounterEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
