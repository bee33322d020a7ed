//! Interface between the facade and a concrete store client
//!
//! A [`StoreClient`] knows how to open a connection; the [`StoreHandle`] it
//! returns issues the handful of commands the facade needs.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A flat mapping of field names to values stored under one key
pub type HashRecord = HashMap<String, String>;

/// Opens connections to a store
#[async_trait]
pub trait StoreClient: Send + Sync {
    type Handle: StoreHandle;

    /// Establish a new connection
    async fn connect(&self) -> Result<Self::Handle>;
}

/// An open connection to a store
#[async_trait]
pub trait StoreHandle: Send {
    /// Get the scalar value stored under `key`
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Store a scalar value under `key`
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Store every field of `record` in the hash under `key`
    async fn hset(&mut self, key: &str, record: &HashRecord) -> Result<()>;

    /// Get all fields of the hash under `key`; empty when the key is missing
    async fn hgetall(&mut self, key: &str) -> Result<HashRecord>;

    /// Ask the store to close the connection
    async fn quit(&mut self) -> Result<()>;

    /// Last known state of the connection
    fn is_open(&self) -> bool;
}
