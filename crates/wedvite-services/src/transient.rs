//! Transient record store
//!
//! Session-scoped staging list. Records edited during a session land here first
//! and reach the durable tier through `commit`. This tier is never swept.

use std::sync::Arc;

use wedvite_core::{
    AppError, AppResult, CommitOutcome, InvitationRecord, MediaCodec, SaveOutcome,
};

use crate::binding::{upsert_by_id, TierBinding};
use crate::durable::DurableStore;

#[derive(Clone)]
pub struct TransientStore {
    binding: TierBinding,
    codec: MediaCodec,
    durable: Arc<DurableStore>,
}

impl TransientStore {
    pub fn new(binding: TierBinding, codec: MediaCodec, durable: Arc<DurableStore>) -> Self {
        Self {
            binding,
            codec,
            durable,
        }
    }

    pub fn binding(&self) -> &TierBinding {
        &self.binding
    }

    pub async fn load_all(&self) -> AppResult<Vec<InvitationRecord>> {
        self.binding.load_records(&self.codec).await
    }

    /// Stage one record. Any failure on the transient tier sends the record to the
    /// durable store instead.
    #[tracing::instrument(skip(self, record), fields(invitation_id = %record.id))]
    pub async fn save(&self, record: InvitationRecord) -> AppResult<SaveOutcome> {
        match self.stage(record.clone()).await {
            Ok(()) => Ok(SaveOutcome::Staged),
            Err(transient_err) => {
                tracing::warn!(
                    error = %transient_err,
                    "Transient save failed, falling back to durable tier"
                );
                match self.durable.upsert(record).await {
                    Ok(()) => Ok(SaveOutcome::FellBackToDurable),
                    Err(durable_err) => {
                        tracing::error!(
                            transient_error = %transient_err,
                            durable_error = %durable_err,
                            "Invitation could not be saved to either tier"
                        );
                        Err(AppError::FallbackFailed {
                            transient: transient_err.to_string(),
                            durable: Box::new(durable_err),
                        })
                    }
                }
            }
        }
    }

    async fn stage(&self, record: InvitationRecord) -> AppResult<()> {
        let mut records = self.load_all().await?;
        upsert_by_id(&mut records, record);
        let serialized = self.binding.encode_records(records, &self.codec)?;
        self.binding.write_raw(&serialized).await?;
        tracing::debug!(
            key = %self.binding.key,
            size_bytes = serialized.len(),
            "Invitation staged"
        );
        Ok(())
    }

    /// Merge every staged record into the durable list, then clear this tier.
    ///
    /// The durable write happens only if some staged record is new or differs from
    /// its durable copy. If that write fails the staged records stay where they are
    /// and the error is returned.
    #[tracing::instrument(skip(self))]
    pub async fn commit(&self) -> AppResult<CommitOutcome> {
        let staged = self.load_all().await?;
        if staged.is_empty() {
            return Ok(CommitOutcome::default());
        }

        let mut merged = self.durable.load_all().await?;
        let staged_count = staged.len();
        let mut changed = 0;
        for record in staged {
            if upsert_by_id(&mut merged, record) {
                changed += 1;
            }
        }

        if changed > 0 {
            self.durable.save_all(merged).await?;
        }
        self.clear().await?;

        tracing::info!(
            staged = staged_count,
            changed,
            "Staged invitations committed"
        );
        Ok(CommitOutcome {
            staged: staged_count,
            changed,
        })
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.binding.clear().await
    }

    /// Drop one staged record. Returns false if it was not staged.
    pub async fn remove(&self, id: &str) -> AppResult<bool> {
        let mut records = self.load_all().await?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        if records.is_empty() {
            self.clear().await?;
        } else {
            let serialized = self.binding.encode_records(records, &self.codec)?;
            self.binding.write_raw(&serialized).await?;
        }
        Ok(true)
    }
}
