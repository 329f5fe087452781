use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Each tier is bound to one backend. It's defined in core because it's used in
/// configuration as well as by the tier implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// The two storage scopes a record can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    /// Persists across sessions and restarts.
    Durable,
    /// Session-scoped staging area.
    Transient,
}

impl FromStr for TierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "durable" => Ok(TierKind::Durable),
            "transient" | "session" => Ok(TierKind::Transient),
            _ => Err(anyhow::anyhow!("Invalid tier: {}", s)),
        }
    }
}

impl Display for TierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TierKind::Durable => write!(f, "durable"),
            TierKind::Transient => write!(f, "transient"),
        }
    }
}
