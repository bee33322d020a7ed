//! Error types for the store facade

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures of an underlying store call.
///
/// The facade never hands these to callers of its plain operations; they are
/// logged at the boundary. They do surface through [`crate::Lookup::Failed`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Not connected to the store")]
    NotConnected,

    #[error("Key must not be empty")]
    EmptyKey,

    #[error("Hash for key \"{0}\" has no fields")]
    EmptyHash(String),

    #[error("Key \"{0}\" holds the wrong kind of value")]
    WrongType(String),
}
