use serde::{Deserialize, Serialize};

use crate::storage_types::{StorageBackend, TierKind};

/// Bytes used by one tier against its assumed ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percentage: f64,
}

impl StorageUsage {
    pub fn new(used_bytes: u64, total_bytes: u64) -> Self {
        let percentage = if total_bytes == 0 {
            100.0
        } else {
            used_bytes as f64 / total_bytes as f64 * 100.0
        };
        Self {
            used_bytes,
            total_bytes,
            percentage,
        }
    }

    pub fn available_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }
}

/// Result of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub cleaned_count: usize,
    pub remaining_count: usize,
}

/// Where a single-record save ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Written to the transient tier; needs a commit to become durable.
    Staged,
    /// The transient write failed or the tier was full; written to the durable tier.
    FellBackToDurable,
}

/// Result of promoting the transient tier into the durable tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    /// Records found in the transient tier.
    pub staged: usize,
    /// Records that were new or differed from their durable copy.
    pub changed: usize,
}

/// Usage and record count for one tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierReport {
    pub tier: TierKind,
    pub backend: StorageBackend,
    pub records: usize,
    pub usage: StorageUsage,
    pub critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReport {
    pub durable: TierReport,
    pub transient: TierReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percentage() {
        let usage = StorageUsage::new(512, 1024);
        assert_eq!(usage.percentage, 50.0);
        assert_eq!(usage.available_bytes(), 512);
    }

    #[test]
    fn zero_ceiling_reads_as_full() {
        let usage = StorageUsage::new(0, 0);
        assert_eq!(usage.percentage, 100.0);
        assert_eq!(usage.available_bytes(), 0);
    }
}
