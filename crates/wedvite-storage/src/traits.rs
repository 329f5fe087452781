//! Tier abstraction trait
//!
//! This module defines the Tier trait that every storage backend implements.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;
use wedvite_core::AppError;

/// Tier operation errors
#[derive(Debug, Error)]
pub enum TierError {
    #[error("Quota exceeded for '{key}': {size} bytes exceeds limit of {limit} bytes")]
    QuotaExceeded { key: String, size: u64, limit: u64 },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for tier operations
pub type TierResult<T> = Result<T, TierError>;

impl From<TierError> for AppError {
    fn from(err: TierError) -> Self {
        match err {
            TierError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Key-value storage tier
///
/// The durable and transient record stores are each bound to one `Tier`. Values are
/// whole serialized blobs; there is no partial update.
///
/// Implementations may refuse a `set` (for example on quota overflow) but must never
/// store a value partially and still report success. The durable store reads every
/// write back to detect backends that do.
#[async_trait]
pub trait Tier: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> TierResult<Option<String>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> TierResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> TierResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
