//! A tier plus the key and ceiling one record store uses on it.

use std::sync::Arc;

use wedvite_core::{AppResult, Config, InvitationRecord, MediaCodec, TierKind};
use wedvite_storage::Tier;

#[derive(Clone)]
pub struct TierBinding {
    pub kind: TierKind,
    pub tier: Arc<dyn Tier>,
    pub key: String,
    pub quota_bytes: u64,
}

impl TierBinding {
    pub fn new(
        kind: TierKind,
        tier: Arc<dyn Tier>,
        key: impl Into<String>,
        quota_bytes: u64,
    ) -> Self {
        Self {
            kind,
            tier,
            key: key.into(),
            quota_bytes,
        }
    }

    pub fn from_config(config: &Config, kind: TierKind, tier: Arc<dyn Tier>) -> Self {
        let tier_config = config.tier(kind);
        Self::new(kind, tier, tier_config.key.clone(), tier_config.quota_bytes)
    }

    /// Raw serialized blob, if any.
    pub async fn read_raw(&self) -> AppResult<Option<String>> {
        Ok(self.tier.get(&self.key).await?)
    }

    pub async fn write_raw(&self, value: &str) -> AppResult<()> {
        Ok(self.tier.set(&self.key, value).await?)
    }

    pub async fn clear(&self) -> AppResult<()> {
        Ok(self.tier.remove(&self.key).await?)
    }

    /// Read and decompress the record list.
    ///
    /// A missing blob is an empty list. So is a blob that does not parse: the
    /// failure is logged and the records are treated as gone. Backend read errors
    /// still propagate, so a failed read never turns into an overwrite.
    pub async fn load_records(&self, codec: &MediaCodec) -> AppResult<Vec<InvitationRecord>> {
        let Some(raw) = self.read_raw().await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<InvitationRecord>>(&raw) {
            Ok(records) => Ok(records
                .into_iter()
                .map(|record| codec.decompress_record(record))
                .collect()),
            Err(e) => {
                tracing::warn!(
                    tier = %self.kind,
                    key = %self.key,
                    size_bytes = raw.len(),
                    error = %e,
                    "Stored invitation list is unreadable, treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Compress and serialize a record list into the stored wire format.
    pub fn encode_records(
        &self,
        records: Vec<InvitationRecord>,
        codec: &MediaCodec,
    ) -> AppResult<String> {
        let compressed: Vec<InvitationRecord> = records
            .into_iter()
            .map(|record| codec.compress_record(record))
            .collect();
        Ok(serde_json::to_string(&compressed)?)
    }
}

/// Replace the record with the same id in place, or append it.
/// Returns true when the list changed.
pub(crate) fn upsert_by_id(records: &mut Vec<InvitationRecord>, record: InvitationRecord) -> bool {
    match records.iter_mut().find(|existing| existing.id == record.id) {
        Some(existing) if *existing == record => false,
        Some(existing) => {
            *existing = record;
            true
        }
        None => {
            records.push(record);
            true
        }
    }
}
