//! The store facade
//!
//! Every operation delegates to one store call, logs how it went, and
//! swallows failures into a default value.

use crate::client::{HashRecord, StoreClient, StoreHandle};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::redis_client::RedisClient;
use tracing::{error, info};

/// Outcome of a read that keeps "missing" and "failed" apart
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(StoreError),
}

impl<T> Lookup<T> {
    /// The value if one was found.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Lookup::Failed(_))
    }
}

/// Thin wrapper owning one connection to a key-value store.
///
/// Not synchronized: operations take `&mut self`, so sharing one facade
/// between tasks needs a lock around it (see [`crate::shared`]).
pub struct StoreFacade<C: StoreClient = RedisClient> {
    client: C,
    handle: Option<C::Handle>,
}

impl StoreFacade<RedisClient> {
    /// Facade over a Redis server. Does not connect.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(RedisClient::new(config))
    }

    /// Facade over the Redis server named by `REDIS_URL`, or the local default.
    pub fn from_env() -> Self {
        Self::new(&StoreConfig::from_env())
    }
}

impl<C: StoreClient> StoreFacade<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            handle: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Open the connection. Failures are logged and leave the facade disconnected.
    pub async fn connect(&mut self) {
        match self.client.connect().await {
            Ok(handle) => {
                self.handle = Some(handle);
                info!("Connected to Redis server");
            }
            Err(e) => {
                error!("Error connecting to Redis server: {}", e);
            }
        }
    }

    /// Last known connection state.
    pub fn is_connected(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| handle.is_open())
    }

    fn handle(&mut self) -> Result<&mut C::Handle> {
        self.handle.as_mut().ok_or(StoreError::NotConnected)
    }

    async fn try_set(&mut self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        self.handle()?.set(key, value).await
    }

    async fn try_get(&mut self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        self.handle()?.get(key).await
    }

    async fn try_set_hash(&mut self, key: &str, record: &HashRecord) -> Result<()> {
        check_key(key)?;
        if record.is_empty() {
            return Err(StoreError::EmptyHash(key.to_string()));
        }
        self.handle()?.hset(key, record).await
    }

    async fn try_get_hash(&mut self, key: &str) -> Result<HashRecord> {
        check_key(key)?;
        self.handle()?.hgetall(key).await
    }

    /// Store `value` under `key`.
    pub async fn set_value(&mut self, key: &str, value: &str) {
        match self.try_set(key, value).await {
            Ok(()) => info!("Key \"{}\" set in Redis", key),
            Err(e) => error!("Error setting key \"{}\" in Redis: {}", key, e),
        }
    }

    /// Read the value under `key`, keeping absence and failure apart.
    pub async fn fetch_value(&mut self, key: &str) -> Lookup<String> {
        match self.try_get(key).await {
            Ok(Some(value)) => {
                info!("Value for key \"{}\": {}", key, value);
                Lookup::Found(value)
            }
            Ok(None) => {
                info!("Value for key \"{}\": null", key);
                Lookup::NotFound
            }
            Err(e) => {
                error!("Error getting value for key \"{}\" from Redis: {}", key, e);
                Lookup::Failed(e)
            }
        }
    }

    /// Read the value under `key`; `None` when missing or on failure.
    pub async fn get_value(&mut self, key: &str) -> Option<String> {
        self.fetch_value(key).await.found()
    }

    /// Store every field of `record` as a hash under `key`.
    pub async fn set_hash(&mut self, key: &str, record: &HashRecord) {
        match self.try_set_hash(key, record).await {
            Ok(()) => info!("Hash set for key \"{}\" in Redis", key),
            Err(e) => error!("Error setting hash for key \"{}\" in Redis: {}", key, e),
        }
    }

    /// Read the hash under `key`, keeping absence and failure apart.
    ///
    /// A hash with no fields does not exist in Redis, so an empty reply is `NotFound`.
    pub async fn fetch_hash(&mut self, key: &str) -> Lookup<HashRecord> {
        match self.try_get_hash(key).await {
            Ok(record) => {
                info!("Hash for key \"{}\": {}", key, describe(&record));
                if record.is_empty() {
                    Lookup::NotFound
                } else {
                    Lookup::Found(record)
                }
            }
            Err(e) => {
                error!("Error getting hash for key \"{}\" from Redis: {}", key, e);
                Lookup::Failed(e)
            }
        }
    }

    /// Read the hash under `key`; empty when missing or on failure.
    pub async fn get_hash(&mut self, key: &str) -> HashRecord {
        self.fetch_hash(key).await.found().unwrap_or_default()
    }

    /// Release the connection. The facade is disconnected afterwards either way.
    pub async fn close(&mut self) {
        let result = match self.handle.take() {
            Some(mut handle) => handle.quit().await,
            None => Err(StoreError::NotConnected),
        };

        match result {
            Ok(()) => info!("Closed connection to Redis server"),
            Err(e) => error!("Error closing connection to Redis server: {}", e),
        }
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    Ok(())
}

/// Pretty JSON rendering of a record for log lines.
fn describe(record: &HashRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| format!("{:?}", record))
}
