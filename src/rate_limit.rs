//! Per-sender rate limiting over an external TTL counter store.
//!
//! Fixed-window counters: each inbound message increments the sender's
//! counter and refreshes its expiry, so the window closes 60 seconds after
//! the last counted message. Counter-store failures never block a message;
//! the limiter fails open.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::store::CounterStore;

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

/// Rate limiter for the inbound SMS webhook.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    enabled: bool,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            enabled: config.enabled,
            max_requests: u64::from(config.max_requests),
            window: Duration::from_secs(config.window_seconds),
        }
    }

    /// Check whether a message from `sender` is within the rate limit.
    ///
    /// Increments the sender's counter at most once, and only when the
    /// current count is below the threshold. An already-limited sender's
    /// counter is left untouched so the window expires on schedule.
    pub async fn check(&self, sender: &str) -> RateLimitDecision {
        if !self.enabled {
            return RateLimitDecision::Allowed;
        }

        let key = counter_key(sender);
        let count = match self.store.get(&key).await {
            Ok(count) => count.unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "rate limit read failed, allowing message");
                return RateLimitDecision::Allowed;
            }
        };

        if count >= self.max_requests {
            warn!(count, limit = self.max_requests, "rate limit exceeded");
            return RateLimitDecision::Limited;
        }

        if let Err(e) = self.store.put_with_ttl(&key, count + 1, self.window).await {
            warn!(error = %e, "rate limit write failed, allowing message");
        } else {
            debug!(count = count + 1, "rate limit check passed");
        }
        RateLimitDecision::Allowed
    }
}

fn counter_key(sender: &str) -> String {
    format!("sms-rate:{sender}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCounterStore, StoreError};
    use async_trait::async_trait;

    fn limiter_with(store: Arc<dyn CounterStore>, max: u32, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(
            store,
            &RateLimitConfig {
                enabled: true,
                max_requests: max,
                window_seconds,
            },
        )
    }

    #[tokio::test]
    async fn allows_messages_under_the_threshold() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = limiter_with(store, 5, 60);

        for _ in 0..5 {
            assert_eq!(
                limiter.check("+15550001111").await,
                RateLimitDecision::Allowed
            );
        }
        assert_eq!(
            limiter.check("+15550001111").await,
            RateLimitDecision::Limited
        );
    }

    #[tokio::test]
    async fn limited_sender_counter_is_not_incremented() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = limiter_with(store.clone(), 2, 60);

        limiter.check("+15550001111").await;
        limiter.check("+15550001111").await;
        limiter.check("+15550001111").await;
        limiter.check("+15550001111").await;

        assert_eq!(store.get("sms-rate:+15550001111").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn senders_are_tracked_independently() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = limiter_with(store, 1, 60);

        assert_eq!(
            limiter.check("+15550001111").await,
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check("+15550001111").await,
            RateLimitDecision::Limited
        );
        assert_eq!(
            limiter.check("+15550002222").await,
            RateLimitDecision::Allowed
        );
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = limiter_with(store, 1, 0);

        assert_eq!(
            limiter.check("+15550001111").await,
            RateLimitDecision::Allowed
        );
        // A zero-second window expires immediately, so the next message sees
        // an absent counter.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            limiter.check("+15550001111").await,
            RateLimitDecision::Allowed
        );
    }

    #[tokio::test]
    async fn disabled_limiter_allows_everything() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = RateLimiter::new(
            store,
            &RateLimitConfig {
                enabled: false,
                max_requests: 1,
                window_seconds: 60,
            },
        );
        for _ in 0..10 {
            assert_eq!(
                limiter.check("+15550001111").await,
                RateLimitDecision::Allowed
            );
        }
    }

    struct FailingCounterStore;

    #[async_trait]
    impl CounterStore for FailingCounterStore {
        async fn get(&self, _key: &str) -> Result<Option<u64>, StoreError> {
            Err(StoreError::Http("connection refused".into()))
        }

        async fn put_with_ttl(
            &self,
            _key: &str,
            _value: u64,
            _ttl: Duration,
        ) -> Result<(), StoreError> {
            Err(StoreError::Http("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn fails_open_on_counter_store_errors() {
        let limiter = limiter_with(Arc::new(FailingCounterStore), 1, 60);
        for _ in 0..10 {
            assert_eq!(
                limiter.check("+15550001111").await,
                RateLimitDecision::Allowed
            );
        }
    }
}
