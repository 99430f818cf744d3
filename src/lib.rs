//! # OOTD Webhook
//!
//! Inbound SMS webhook service for the OOTD app.
//!
//! Each inbound message is one HTTP request from the messaging provider:
//! the handler decodes the form payload, applies a per-sender rate limit
//! backed by a TTL counter store, dispatches the normalized command against
//! the subscriber record store, and replies with the provider's
//! `<Response><Message>` XML envelope.
//!
//! ## Features
//!
//! - **Command dispatch**: `FINDOOTD` subscribes and returns the app
//!   download link; `HELPOOTD` returns the support reply (subscribing as a
//!   side effect); anything else gets the unknown-command reply
//! - **Rate limiting**: fixed-window per-sender counters with 60-second
//!   expiry, failing open on counter-store errors
//! - **Pluggable stores**: record and counter stores behind traits, with
//!   in-process and HTTP-backed (PostgREST / Redis-REST) implementations
//! - **Defined failure paths**: every error maps to a transport status or a
//!   user-facing XML reply, never an unhandled fault
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ootd_webhook::prelude::*;
//!
//! # async fn run() {
//! let config = AppConfig::default();
//! let counters = Arc::new(MemoryCounterStore::new());
//! let state = AppState {
//!     subscribers: Some(Arc::new(MemorySubscriberStore::new())),
//!     limiter: RateLimiter::new(counters, &config.rate_limit),
//! };
//!
//! let app = router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod command;
pub mod config;
pub mod handler;
pub mod rate_limit;
pub mod replies;
pub mod store;
pub mod twiml;

/// Common imports for embedding the webhook service
pub mod prelude {
    pub use crate::command::Command;
    pub use crate::config::{
        AppConfig, CounterStoreConfig, LoggingConfig, RateLimitConfig, ServerConfig,
        SubscriberStoreConfig,
    };
    pub use crate::handler::{AppState, router};
    pub use crate::rate_limit::{RateLimitDecision, RateLimiter};
    pub use crate::store::{
        CounterStore, MemoryCounterStore, MemorySubscriberStore, RestCounterStore,
        RestSubscriberStore, StoreError, Subscriber, SubscriberStore,
    };
}
