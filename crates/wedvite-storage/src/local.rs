use crate::keys::validate_key;
use crate::traits::{Tier, TierError, TierResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem tier: one file per key under `base_path`.
#[derive(Clone)]
pub struct LocalTier {
    base_path: PathBuf,
    quota_bytes: Option<u64>,
}

impl LocalTier {
    /// Create a new LocalTier instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding this tier's blobs (e.g., "./.wedvite/durable")
    /// * `quota_bytes` - When set, `set` rejects values larger than this
    pub async fn new(base_path: impl Into<PathBuf>, quota_bytes: Option<u64>) -> TierResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            TierError::ConfigError(format!(
                "Failed to create tier directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalTier {
            base_path,
            quota_bytes,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_to_path(&self, key: &str) -> TierResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json.tmp", key))
    }
}

#[async_trait]
impl Tier for LocalTier {
    async fn get(&self, key: &str) -> TierResult<Option<String>> {
        let path = self.key_to_path(key)?;

        match fs::read(&path).await {
            Ok(bytes) => {
                let value = match String::from_utf8(bytes) {
                    Ok(value) => value,
                    // Undecodable content is handed up as-is so the record store
                    // treats it like any other unparseable blob.
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            key = %key,
                            error = %e.utf8_error(),
                            "Local tier file is not valid UTF-8"
                        );
                        String::from_utf8_lossy(e.as_bytes()).into_owned()
                    }
                };
                tracing::debug!(
                    path = %path.display(),
                    key = %key,
                    size_bytes = value.len(),
                    "Local tier read"
                );
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TierError::ReadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> TierResult<()> {
        let path = self.key_to_path(key)?;
        let size = value.len() as u64;

        if let Some(limit) = self.quota_bytes {
            if size > limit {
                tracing::warn!(
                    key = %key,
                    size_bytes = size,
                    limit_bytes = limit,
                    "Local tier write rejected by quota"
                );
                return Err(TierError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }

        let start = std::time::Instant::now();

        // Write beside the target and rename over it, so the previous blob stays
        // whole until the new one is fully on disk.
        let staging = self.staging_path(key);

        let mut file = fs::File::create(&staging).await.map_err(|e| {
            TierError::WriteFailed(format!("Failed to create file {}: {}", staging.display(), e))
        })?;

        file.write_all(value.as_bytes()).await.map_err(|e| {
            TierError::WriteFailed(format!("Failed to write file {}: {}", staging.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            TierError::WriteFailed(format!("Failed to sync file {}: {}", staging.display(), e))
        })?;
        drop(file);

        fs::rename(&staging, &path).await.map_err(|e| {
            TierError::WriteFailed(format!(
                "Failed to move {} into place at {}: {}",
                staging.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local tier write successful"
        );

        Ok(())
    }

    async fn remove(&self, key: &str) -> TierResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), key = %key, "Local tier key removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TierError::WriteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
