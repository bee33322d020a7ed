//! redis-facade - a small logging wrapper around a Redis client
//!
//! [`StoreFacade`] exposes connect, get, set, hash-set, hash-get-all and
//! close. Each operation delegates to one client call and logs the outcome;
//! failures become `None` or an empty hash instead of errors. Callers that
//! need to tell a missing key from a failed call use the `fetch_*` variants,
//! which return a [`Lookup`].
//!
//! The store behind the facade is pluggable through [`StoreClient`]:
//! [`RedisClient`] talks to a real server, [`MemoryClient`] keeps everything
//! in process.

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod memory;
pub mod redis_client;
pub mod shared;

pub use client::{HashRecord, StoreClient, StoreHandle};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use facade::{Lookup, StoreFacade};
pub use memory::{MemoryClient, MemoryStore};
pub use redis_client::RedisClient;
pub use shared::{init_shared, shared};
