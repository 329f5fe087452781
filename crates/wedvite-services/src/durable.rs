//! Durable record store
//!
//! The permanent invitation list. Every mutation rewrites the whole blob; there is
//! no delta write.
//!
//! Writes go through two guards:
//! 1. Capacity: a critical tier triggers a forced retention sweep first. If the tier
//!    is still critical afterwards the write is refused with `CapacityExceeded`.
//! 2. Integrity: after writing, the blob is read back and compared byte for byte,
//!    catching backends that truncate on quota overflow without failing.

use wedvite_core::{AppError, AppResult, InvitationRecord, MediaCodec, SweepReport, TierKind};

use crate::binding::{upsert_by_id, TierBinding};
use crate::capacity::CapacityMonitor;
use crate::sweeper::{is_expired, RetentionSweeper};

#[derive(Clone)]
pub struct DurableStore {
    binding: TierBinding,
    monitor: CapacityMonitor,
    codec: MediaCodec,
    sweeper: RetentionSweeper,
}

impl DurableStore {
    pub fn new(
        binding: TierBinding,
        monitor: CapacityMonitor,
        codec: MediaCodec,
        sweeper: RetentionSweeper,
    ) -> Self {
        Self {
            binding,
            monitor,
            codec,
            sweeper,
        }
    }

    pub fn monitor(&self) -> &CapacityMonitor {
        &self.monitor
    }

    pub fn binding(&self) -> &TierBinding {
        &self.binding
    }

    /// All records in stored order, media decompressed.
    pub async fn load_all(&self) -> AppResult<Vec<InvitationRecord>> {
        self.binding.load_records(&self.codec).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<InvitationRecord>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|record| record.id == id))
    }

    /// Replace the whole durable list.
    #[tracing::instrument(skip(self, records), fields(store.tier = "durable", records = records.len()))]
    pub async fn save_all(&self, mut records: Vec<InvitationRecord>) -> AppResult<()> {
        if self.monitor.is_critical(TierKind::Durable).await? {
            let pass = self
                .sweeper
                .run(self, self.sweeper.forced_retention_days(), true)
                .await?;
            let evicted = pass.report.cleaned_count;

            let usage = self.monitor.usage(TierKind::Durable).await?;
            if usage.percentage > self.monitor.threshold_percent() {
                tracing::error!(
                    usage_percent = usage.percentage,
                    evicted,
                    "Durable tier still critical after forced cleanup, refusing write"
                );
                return Err(AppError::CapacityExceeded {
                    percentage: usage.percentage,
                    evicted,
                });
            }

            // Records the sweep just removed must not come back through this write.
            if !pass.evicted_ids.is_empty() {
                records.retain(|record| {
                    !(pass.evicted_ids.contains(&record.id) && is_expired(record, pass.cutoff))
                });
            }

            tracing::info!(
                evicted,
                usage_percent = usage.percentage,
                "Forced cleanup freed enough space"
            );
        }

        self.write_verified(records).await
    }

    /// Compress, write and read back. Skips the capacity guard, so only paths that
    /// shrink the list (sweeps, removals) may call it directly.
    pub(crate) async fn write_verified(&self, records: Vec<InvitationRecord>) -> AppResult<()> {
        let count = records.len();
        let serialized = self.binding.encode_records(records, &self.codec)?;

        self.binding.write_raw(&serialized).await?;

        let read_back = self.binding.read_raw().await?.unwrap_or_default();
        if read_back != serialized {
            tracing::error!(
                key = %self.binding.key,
                written_bytes = serialized.len(),
                read_bytes = read_back.len(),
                "Durable write verification failed"
            );
            return Err(AppError::IntegrityCheckFailed {
                key: self.binding.key.clone(),
                written_bytes: serialized.len(),
                read_bytes: read_back.len(),
            });
        }

        tracing::debug!(
            key = %self.binding.key,
            records = count,
            size_bytes = serialized.len(),
            "Durable tier written"
        );
        Ok(())
    }

    /// Insert or replace one record by id.
    pub async fn upsert(&self, record: InvitationRecord) -> AppResult<()> {
        let mut records = self.load_all().await?;
        upsert_by_id(&mut records, record);
        self.save_all(records).await
    }

    /// Remove one record by id. Returns false if it was not stored.
    ///
    /// Removal only shrinks the blob, so it is allowed even when the tier is critical.
    pub async fn remove(&self, id: &str) -> AppResult<bool> {
        let mut records = self.load_all().await?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_verified(records).await?;
        tracing::info!(invitation_id = %id, "Invitation deleted from durable tier");
        Ok(true)
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.binding.clear().await
    }

    /// Run the retention sweeper against this store.
    pub async fn sweep(&self, age_threshold_days: u32, forced: bool) -> AppResult<SweepReport> {
        self.sweeper.sweep(self, age_threshold_days, forced).await
    }
}
