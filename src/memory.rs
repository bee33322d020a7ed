//! In-memory store with thread-safe access
//!
//! Backs the facade in tests and offline runs. Mirrors the slice of Redis
//! semantics the facade relies on: scalars and hashes live in one keyspace,
//! and reading a key as the wrong kind fails.

use crate::client::{HashRecord, StoreClient, StoreHandle};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A value stored under one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Scalar(String),
    Hash(HashRecord),
}

/// Thread-safe in-memory keyspace
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a scalar value by key
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self.data.read().await;
        match data.get(key) {
            Some(Entry::Scalar(value)) => Ok(Some(value.clone())),
            Some(Entry::Hash(_)) => Err(StoreError::WrongType(key.to_string())),
            None => Ok(None),
        }
    }

    /// Set a scalar value, replacing whatever the key held
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut data = self.data.write().await;
        data.insert(key.into(), Entry::Scalar(value.into()));
        Ok(())
    }

    /// Merge `fields` into the hash under `key`, returning how many were new
    pub async fn hset<I, F, V>(&self, key: &str, fields: I) -> Result<usize>
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<String>,
        V: Into<String>,
    {
        let mut data = self.data.write().await;
        let entry = data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashRecord::new()));

        let hash = match entry {
            Entry::Hash(hash) => hash,
            Entry::Scalar(_) => return Err(StoreError::WrongType(key.to_string())),
        };

        let mut added = 0;
        for (field, value) in fields {
            if hash.insert(field.into(), value.into()).is_none() {
                added += 1;
            }
        }

        // A hash with no fields does not exist
        if hash.is_empty() {
            data.remove(key);
        }
        Ok(added)
    }

    /// Get every field of the hash under `key`; empty when missing
    pub async fn hgetall(&self, key: &str) -> Result<HashRecord> {
        let data = self.data.read().await;
        match data.get(key) {
            Some(Entry::Hash(hash)) => Ok(hash.clone()),
            Some(Entry::Scalar(_)) => Err(StoreError::WrongType(key.to_string())),
            None => Ok(HashRecord::new()),
        }
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> bool {
        let data = self.data.read().await;
        data.contains_key(key)
    }

    /// Number of keys held
    pub async fn len(&self) -> usize {
        let data = self.data.read().await;
        data.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Client handing out connections to one shared [`MemoryStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    store: MemoryStore,
}

impl MemoryClient {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    type Handle = MemoryHandle;

    async fn connect(&self) -> Result<MemoryHandle> {
        Ok(MemoryHandle {
            store: self.store.clone(),
            open: true,
        })
    }
}

/// Connection to a [`MemoryStore`]; unusable once quit
#[derive(Debug)]
pub struct MemoryHandle {
    store: MemoryStore,
    open: bool,
}

impl MemoryHandle {
    fn store(&self) -> Result<&MemoryStore> {
        if self.open {
            Ok(&self.store)
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.store()?.get(key).await
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.store()?.set(key, value).await
    }

    async fn hset(&mut self, key: &str, record: &HashRecord) -> Result<()> {
        self.store()?.hset(key, record.clone()).await?;
        Ok(())
    }

    async fn hgetall(&mut self, key: &str) -> Result<HashRecord> {
        self.store()?.hgetall(key).await
    }

    async fn quit(&mut self) -> Result<()> {
        self.store()?;
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
