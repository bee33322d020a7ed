//! Store client backed by the `redis` crate

use crate::client::{HashRecord, StoreClient, StoreHandle};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};
use tracing::{debug, warn};

/// Client for a Redis server at a configured URL
#[derive(Debug, Clone)]
pub struct RedisClient {
    url: String,
}

impl RedisClient {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            url: config.url.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StoreClient for RedisClient {
    type Handle = RedisHandle;

    async fn connect(&self) -> Result<RedisHandle> {
        debug!("Opening Redis connection to {}", self.url);

        // URL errors surface here rather than at construction
        let client = redis::Client::open(self.url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;

        Ok(RedisHandle { conn, open: true })
    }
}

/// Multiplexed connection to a Redis server
pub struct RedisHandle {
    conn: MultiplexedConnection,
    open: bool,
}

impl RedisHandle {
    /// Record a failed call, noting when it took the connection down.
    fn observe(&mut self, err: RedisError) -> StoreError {
        if err.is_connection_dropped() && self.open {
            warn!("Redis client not connected to server: {}", err);
            self.open = false;
        }
        StoreError::Redis(err)
    }
}

/// Build a variadic `HSET key field value [field value ...]`.
///
/// `AsyncCommands::hset_multiple` emits `HMSET`, which Redis has deprecated.
fn hset_command(key: &str, record: &HashRecord) -> redis::Cmd {
    let mut cmd = redis::cmd("HSET");
    cmd.arg(key);
    for (field, value) in record {
        cmd.arg(field).arg(value);
    }
    cmd
}

#[async_trait]
impl StoreHandle for RedisHandle {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: std::result::Result<Option<String>, RedisError> = self.conn.get(key).await;
        value.map_err(|e| self.observe(e))
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let reply: std::result::Result<(), RedisError> = self.conn.set(key, value).await;
        reply.map_err(|e| self.observe(e))
    }

    async fn hset(&mut self, key: &str, record: &HashRecord) -> Result<()> {
        let reply: std::result::Result<i64, RedisError> =
            hset_command(key, record).query_async(&mut self.conn).await;
        match reply {
            Ok(added) => {
                debug!("HSET {} added {} new fields", key, added);
                Ok(())
            }
            Err(e) => Err(self.observe(e)),
        }
    }

    async fn hgetall(&mut self, key: &str) -> Result<HashRecord> {
        let record: std::result::Result<HashRecord, RedisError> = self.conn.hgetall(key).await;
        record.map_err(|e| self.observe(e))
    }

    async fn quit(&mut self) -> Result<()> {
        let reply: std::result::Result<(), RedisError> =
            redis::cmd("QUIT").query_async(&mut self.conn).await;
        // The server drops the socket after QUIT whatever the reply was
        self.open = false;
        reply.map_err(StoreError::Redis)
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
