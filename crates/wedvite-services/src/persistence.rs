//! Persistence facade
//!
//! One handle over both record stores, the capacity monitor and the sweeper. Built
//! either from a ready `TierPair` or straight from configuration.

use std::sync::Arc;

use wedvite_core::{
    AppResult, CommitOutcome, Config, InvitationRecord, SaveOutcome, StorageReport, SweepReport,
    TierKind, TierReport,
};
use wedvite_storage::{create_tiers, Tier, TierPair};

use crate::binding::TierBinding;
use crate::capacity::CapacityMonitor;
use crate::durable::DurableStore;
use crate::sweeper::RetentionSweeper;
use crate::transient::TransientStore;

#[derive(Clone)]
pub struct InvitationPersistence {
    durable: Arc<DurableStore>,
    transient: TransientStore,
    monitor: CapacityMonitor,
    retention_days: u32,
}

impl InvitationPersistence {
    pub fn new(tiers: TierPair, config: &Config) -> Self {
        let durable_binding = TierBinding::from_config(config, TierKind::Durable, tiers.durable);
        let transient_binding =
            TierBinding::from_config(config, TierKind::Transient, tiers.transient);
        let monitor = CapacityMonitor::new(
            durable_binding.clone(),
            transient_binding.clone(),
            config.critical_threshold_percent,
        );
        let codec = config.codec();

        let durable = Arc::new(DurableStore::new(
            durable_binding,
            monitor.clone(),
            codec.clone(),
            RetentionSweeper::new(config.forced_retention_days),
        ));
        let transient = TransientStore::new(transient_binding, codec, durable.clone());

        Self {
            durable,
            transient,
            monitor,
            retention_days: config.retention_days,
        }
    }

    /// Build both tiers from configuration and wrap them.
    pub async fn open(config: &Config) -> AppResult<Self> {
        let tiers = create_tiers(config).await?;
        tracing::info!(
            durable_backend = %tiers.durable.backend_type(),
            transient_backend = %tiers.transient.backend_type(),
            data_dir = %config.data_dir.display(),
            "Invitation persistence opened"
        );
        Ok(Self::new(tiers, config))
    }

    pub fn durable(&self) -> &DurableStore {
        &self.durable
    }

    pub fn transient(&self) -> &TransientStore {
        &self.transient
    }

    pub fn monitor(&self) -> &CapacityMonitor {
        &self.monitor
    }

    /// Save one record, staging it when the transient tier has room.
    ///
    /// A critical transient tier first triggers a regular durable sweep. If the
    /// transient tier is still critical afterwards the record goes straight to the
    /// durable store.
    #[tracing::instrument(skip(self, record), fields(invitation_id = %record.id))]
    pub async fn persist(&self, record: InvitationRecord) -> AppResult<SaveOutcome> {
        if self.monitor.is_critical(TierKind::Transient).await? {
            let report = self.durable.sweep(self.retention_days, false).await?;
            tracing::info!(
                cleaned = report.cleaned_count,
                "Swept durable tier because transient tier is critical"
            );

            if self.monitor.is_critical(TierKind::Transient).await? {
                tracing::warn!("Transient tier still critical, saving directly to durable tier");
                self.durable.upsert(record).await?;
                return Ok(SaveOutcome::FellBackToDurable);
            }
        }

        self.transient.save(record).await
    }

    pub async fn commit(&self) -> AppResult<CommitOutcome> {
        self.transient.commit().await
    }

    /// Throw away everything staged.
    pub async fn discard_staged(&self) -> AppResult<()> {
        self.transient.clear().await?;
        tracing::info!("Staged invitations discarded");
        Ok(())
    }

    /// Durable records only.
    pub async fn load_all(&self) -> AppResult<Vec<InvitationRecord>> {
        self.durable.load_all().await
    }

    /// Durable records with staged edits applied on top. A staged copy replaces its
    /// durable counterpart in place; staged records with new ids follow in staging
    /// order.
    pub async fn working_set(&self) -> AppResult<Vec<InvitationRecord>> {
        let mut records = self.durable.load_all().await?;
        for staged in self.transient.load_all().await? {
            match records.iter_mut().find(|record| record.id == staged.id) {
                Some(existing) => *existing = staged,
                None => records.push(staged),
            }
        }
        Ok(records)
    }

    /// Remove a record from both tiers. True if either tier held it.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let staged = self.transient.remove(id).await?;
        let durable = self.durable.remove(id).await?;
        Ok(staged || durable)
    }

    pub async fn sweep(&self, age_threshold_days: u32, forced: bool) -> AppResult<SweepReport> {
        self.durable.sweep(age_threshold_days, forced).await
    }

    /// Usage, record count and criticality for both tiers.
    pub async fn report(&self) -> AppResult<StorageReport> {
        let durable = self
            .tier_report(self.durable.binding(), self.durable.load_all().await?.len())
            .await?;
        let transient = self
            .tier_report(
                self.transient.binding(),
                self.transient.load_all().await?.len(),
            )
            .await?;
        Ok(StorageReport { durable, transient })
    }

    async fn tier_report(&self, binding: &TierBinding, records: usize) -> AppResult<TierReport> {
        let usage = self.monitor.usage(binding.kind).await?;
        Ok(TierReport {
            tier: binding.kind,
            backend: binding.tier.backend_type(),
            records,
            critical: usage.percentage > self.monitor.threshold_percent(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedvite_storage::{MemoryTier, Tier};

    fn persistence(durable: &MemoryTier, transient: &MemoryTier, quota: u64) -> InvitationPersistence {
        let mut config = Config::default();
        config.durable.quota_bytes = quota;
        config.transient.quota_bytes = quota;
        let tiers = TierPair {
            durable: Arc::new(durable.clone()),
            transient: Arc::new(transient.clone()),
        };
        InvitationPersistence::new(tiers, &config)
    }

    #[tokio::test]
    async fn working_set_overlays_staged_records() {
        let p = persistence(&MemoryTier::new(), &MemoryTier::new(), 1 << 20);
        p.durable()
            .save_all(vec![InvitationRecord::new("a"), InvitationRecord::new("b")])
            .await
            .unwrap();
        p.persist(InvitationRecord {
            venue: Some("Chapel".to_string()),
            ..InvitationRecord::new("a")
        })
        .await
        .unwrap();
        p.persist(InvitationRecord::new("c")).await.unwrap();

        let working = p.working_set().await.unwrap();
        let ids: Vec<&str> = working.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(working[0].venue.as_deref(), Some("Chapel"));
        assert_eq!(p.load_all().await.unwrap()[0].venue, None);
    }

    #[tokio::test]
    async fn persist_goes_durable_when_transient_is_full() {
        let durable = MemoryTier::new();
        let transient = MemoryTier::new();
        let p = persistence(&durable, &transient, 100);
        transient.set("wedding_invitations_temp", &"x".repeat(95)).await.unwrap();

        let outcome = p.persist(InvitationRecord::new("a")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::FellBackToDurable);
        assert_eq!(p.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_from_both_tiers() {
        let p = persistence(&MemoryTier::new(), &MemoryTier::new(), 1 << 20);
        p.durable().upsert(InvitationRecord::new("a")).await.unwrap();
        p.persist(InvitationRecord::new("a")).await.unwrap();

        assert!(p.delete("a").await.unwrap());
        assert!(p.working_set().await.unwrap().is_empty());
        assert!(!p.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn report_counts_records_per_tier() {
        let p = persistence(&MemoryTier::new(), &MemoryTier::new(), 1 << 20);
        p.durable().upsert(InvitationRecord::new("a")).await.unwrap();
        p.persist(InvitationRecord::new("b")).await.unwrap();
        p.persist(InvitationRecord::new("c")).await.unwrap();

        let report = p.report().await.unwrap();
        assert_eq!(report.durable.records, 1);
        assert_eq!(report.transient.records, 2);
        assert_eq!(report.transient.tier, TierKind::Transient);
        assert!(!report.durable.critical);
        assert!(report.durable.usage.used_bytes > 0);
    }

    #[tokio::test]
    async fn discard_staged_leaves_durable_alone() {
        let p = persistence(&MemoryTier::new(), &MemoryTier::new(), 1 << 20);
        p.durable().upsert(InvitationRecord::new("a")).await.unwrap();
        p.persist(InvitationRecord::new("b")).await.unwrap();

        p.discard_staged().await.unwrap();
        assert_eq!(p.working_set().await.unwrap().len(), 1);
        assert_eq!(p.commit().await.unwrap(), CommitOutcome::default());
    }
}
