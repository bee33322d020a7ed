//! redis-facade demo binary
//!
//! Runs the canonical session against the server named by `REDIS_URL`
//! (default: local Redis) and logs every step.

use redis_facade::{HashRecord, StoreFacade};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut store = StoreFacade::from_env();

    store.connect().await;

    store.set_value("key", "value").await;
    let _value = store.get_value("key").await;

    let session: HashRecord = [
        ("name", "John"),
        ("surname", "Smith"),
        ("company", "Redis"),
        ("age", "29"),
    ]
    .into_iter()
    .map(|(field, value)| (field.to_string(), value.to_string()))
    .collect();
    store.set_hash("user-session:123", &session).await;
    let _session = store.get_hash("user-session:123").await;

    // Close regardless of how the calls above went
    store.close().await;
}
