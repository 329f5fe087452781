//! Capacity monitor
//!
//! Measures how much of each tier's assumed ceiling the stored blob occupies.
//!
//! The ceiling is a configured estimate (5 MiB by default, the usual browser
//! storage quota), not a limit the backend reports. Real headroom may be larger or
//! smaller; treat `is_critical` as a conservative heuristic.

use wedvite_core::{AppResult, StorageUsage, TierKind};

use crate::binding::TierBinding;

#[derive(Clone)]
pub struct CapacityMonitor {
    durable: TierBinding,
    transient: TierBinding,
    threshold_percent: f64,
}

impl CapacityMonitor {
    pub fn new(durable: TierBinding, transient: TierBinding, threshold_percent: f64) -> Self {
        Self {
            durable,
            transient,
            threshold_percent,
        }
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    fn binding(&self, kind: TierKind) -> &TierBinding {
        match kind {
            TierKind::Durable => &self.durable,
            TierKind::Transient => &self.transient,
        }
    }

    /// UTF-8 byte length of the tier's blob against the tier's ceiling. Read-only.
    pub async fn usage(&self, kind: TierKind) -> AppResult<StorageUsage> {
        let binding = self.binding(kind);
        let used_bytes = binding
            .read_raw()
            .await?
            .map(|raw| raw.len() as u64)
            .unwrap_or(0);
        Ok(StorageUsage::new(used_bytes, binding.quota_bytes))
    }

    /// True when usage is above the critical threshold.
    pub async fn is_critical(&self, kind: TierKind) -> AppResult<bool> {
        let usage = self.usage(kind).await?;
        let critical = usage.percentage > self.threshold_percent;
        if critical {
            tracing::warn!(
                tier = %kind,
                used_bytes = usage.used_bytes,
                total_bytes = usage.total_bytes,
                usage_percent = usage.percentage,
                threshold = self.threshold_percent,
                "Storage tier usage exceeds threshold"
            );
        }
        Ok(critical)
    }
}
