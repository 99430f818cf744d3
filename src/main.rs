use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ootd_webhook::config::AppConfig;
use ootd_webhook::handler::{AppState, router};
use ootd_webhook::rate_limit::RateLimiter;
use ootd_webhook::store::{
    CounterStore, MemoryCounterStore, RestCounterStore, RestSubscriberStore, SubscriberStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    let subscribers: Option<Arc<dyn SubscriberStore>> = match &config.subscriber_store {
        Some(store) => Some(Arc::new(RestSubscriberStore::new(
            store.url.clone(),
            store.service_key.clone(),
            store.table.clone(),
        ))),
        None => {
            // The service still answers; every command gets the
            // configuration-error reply until the store is configured.
            warn!("subscriber store settings missing");
            None
        }
    };

    let counters: Arc<dyn CounterStore> = match &config.counter_store {
        Some(store) => Arc::new(RestCounterStore::new(store.url.clone(), store.token.clone())),
        None => {
            info!("counter store settings missing, using in-process counters");
            Arc::new(MemoryCounterStore::new())
        }
    };

    let state = AppState {
        subscribers,
        limiter: RateLimiter::new(counters, &config.rate_limit),
    };
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening for inbound SMS webhooks");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
