//! In-memory tier
//!
//! Process-local map with the same optional quota behaviour as the local backend.
//! Used by tests and by the `memory` backend setting.

use crate::traits::{Tier, TierError, TierResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Tier that keeps its blobs in memory. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryTier {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<u64>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> TierResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|e| {
            tracing::error!(error = %e, "Memory tier lock poisoned");
            TierError::BackendError("Memory tier lock poisoned".to_string())
        })
    }
}

#[async_trait]
impl Tier for MemoryTier {
    async fn get(&self, key: &str) -> TierResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> TierResult<()> {
        let size = value.len() as u64;
        if let Some(limit) = self.quota_bytes {
            if size > limit {
                tracing::warn!(
                    key = %key,
                    size_bytes = size,
                    limit_bytes = limit,
                    "Memory tier write rejected by quota"
                );
                return Err(TierError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }

        self.lock()?.insert(key.to_string(), value.to_string());
        tracing::debug!(key = %key, size_bytes = size, "Memory tier write");
        Ok(())
    }

    async fn remove(&self, key: &str) -> TierResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
