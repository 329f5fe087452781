//! Retention sweeper
//!
//! Deletes durable records older than an age threshold, oldest first.
//!
//! Eviction is permanent: swept records are not moved to another tier, and the
//! only criterion is age. A record the couple still cares about is deleted just the
//! same once it is old enough. Records without a usable recency (`updatedAt`, or a
//! parseable `date`) are never swept.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use wedvite_core::{AppResult, InvitationRecord, SweepReport, TierKind};

use crate::durable::DurableStore;

/// Outcome of one pass, with what the durable store needs to reconcile a pending write.
pub(crate) struct SweepPass {
    pub report: SweepReport,
    pub evicted_ids: HashSet<String>,
    pub cutoff: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetentionSweeper {
    forced_retention_days: u32,
}

impl RetentionSweeper {
    pub fn new(forced_retention_days: u32) -> Self {
        Self {
            forced_retention_days,
        }
    }

    pub fn forced_retention_days(&self) -> u32 {
        self.forced_retention_days
    }

    /// Threshold actually applied: clamped to the forced threshold when the sweep
    /// is forced or the durable tier is already critical.
    pub fn effective_threshold_days(&self, age_threshold_days: u32, forced: bool, critical: bool) -> u32 {
        if forced || critical {
            age_threshold_days.min(self.forced_retention_days)
        } else {
            age_threshold_days
        }
    }

    /// Sweep the durable tier and report how many records were removed.
    pub async fn sweep(
        &self,
        store: &DurableStore,
        age_threshold_days: u32,
        forced: bool,
    ) -> AppResult<SweepReport> {
        Ok(self.run(store, age_threshold_days, forced).await?.report)
    }

    #[tracing::instrument(skip(self, store))]
    pub(crate) async fn run(
        &self,
        store: &DurableStore,
        age_threshold_days: u32,
        forced: bool,
    ) -> AppResult<SweepPass> {
        let records = store.load_all().await?;
        let critical = store.monitor().is_critical(TierKind::Durable).await?;
        let threshold_days = self.effective_threshold_days(age_threshold_days, forced, critical);

        // A threshold reaching past the earliest representable date expires nothing.
        let Some(cutoff) = retention_cutoff(Utc::now(), threshold_days) else {
            tracing::debug!(threshold_days, "Retention threshold out of range, nothing to remove");
            return Ok(SweepPass {
                report: SweepReport {
                    cleaned_count: 0,
                    remaining_count: records.len(),
                },
                evicted_ids: HashSet::new(),
                cutoff: DateTime::<Utc>::MIN_UTC,
            });
        };

        let expired = expired_oldest_first(&records, cutoff);

        if expired.is_empty() {
            tracing::debug!(
                threshold_days,
                remaining = records.len(),
                "Retention sweep found nothing to remove"
            );
            return Ok(SweepPass {
                report: SweepReport {
                    cleaned_count: 0,
                    remaining_count: records.len(),
                },
                evicted_ids: HashSet::new(),
                cutoff,
            });
        }

        for &idx in &expired {
            let record = &records[idx];
            tracing::info!(
                invitation_id = %record.id,
                recency = ?record.recency(),
                threshold_days,
                "Deleting expired invitation"
            );
        }

        let expired: HashSet<usize> = expired.into_iter().collect();
        let mut evicted_ids = HashSet::new();
        let mut survivors = Vec::with_capacity(records.len() - expired.len());
        for (idx, record) in records.into_iter().enumerate() {
            if expired.contains(&idx) {
                evicted_ids.insert(record.id);
            } else {
                survivors.push(record);
            }
        }

        let report = SweepReport {
            cleaned_count: expired.len(),
            remaining_count: survivors.len(),
        };

        store.write_verified(survivors).await?;

        tracing::info!(
            cleaned = report.cleaned_count,
            remaining = report.remaining_count,
            threshold_days,
            forced,
            critical,
            "Retention sweep completed"
        );

        Ok(SweepPass {
            report,
            evicted_ids,
            cutoff,
        })
    }
}

/// `now` minus `threshold_days`, or `None` when that date cannot be represented.
fn retention_cutoff(now: DateTime<Utc>, threshold_days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(threshold_days)).and_then(|age| now.checked_sub_signed(age))
}

/// Indices of records older than `cutoff`, oldest first.
fn expired_oldest_first(records: &[InvitationRecord], cutoff: DateTime<Utc>) -> Vec<usize> {
    let mut dated: Vec<(DateTime<Utc>, usize)> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| record.recency().map(|at| (at, idx)))
        .collect();
    dated.sort();

    dated
        .into_iter()
        .take_while(|(at, _)| *at < cutoff)
        .map(|(_, idx)| idx)
        .collect()
}

/// Whether `record` would be removed by a sweep with this cutoff.
pub(crate) fn is_expired(record: &InvitationRecord, cutoff: DateTime<Utc>) -> bool {
    record.recency().is_some_and(|at| at < cutoff)
}
