#![allow(dead_code)]

//! Test helpers: build an `InvitationPersistence` over in-memory tiers.
//!
//! Run from workspace root: `cargo test -p wedvite-services`.

pub mod fixtures;

use std::sync::Arc;

use async_trait::async_trait;
use wedvite_core::Config;
use wedvite_services::InvitationPersistence;
use wedvite_storage::{MemoryTier, StorageBackend, Tier, TierPair, TierResult};

pub const DURABLE_KEY: &str = "wedding_invitations";
pub const TRANSIENT_KEY: &str = "wedding_invitations_temp";

/// Persistence handle plus direct access to the tiers behind it.
pub struct TestStores {
    pub persistence: InvitationPersistence,
    pub durable: Arc<dyn Tier>,
    pub transient: Arc<dyn Tier>,
}

impl TestStores {
    pub async fn durable_raw(&self) -> Option<String> {
        self.durable.get(DURABLE_KEY).await.unwrap()
    }

    pub async fn transient_raw(&self) -> Option<String> {
        self.transient.get(TRANSIENT_KEY).await.unwrap()
    }
}

/// Config with the given assumed ceilings and default keys.
pub fn test_config(durable_quota: u64, transient_quota: u64) -> Config {
    let mut config = Config::default();
    config.durable.backend = StorageBackend::Memory;
    config.transient.backend = StorageBackend::Memory;
    config.durable.quota_bytes = durable_quota;
    config.transient.quota_bytes = transient_quota;
    config
}

pub fn setup_with_tiers(
    durable: Arc<dyn Tier>,
    transient: Arc<dyn Tier>,
    config: &Config,
) -> TestStores {
    let tiers = TierPair {
        durable: durable.clone(),
        transient: transient.clone(),
    };
    TestStores {
        persistence: InvitationPersistence::new(tiers, config),
        durable,
        transient,
    }
}

/// Two unbounded memory tiers with a 1 MiB assumed ceiling each.
pub fn setup_test_stores() -> TestStores {
    setup_with_tiers(
        Arc::new(MemoryTier::new()),
        Arc::new(MemoryTier::new()),
        &test_config(1 << 20, 1 << 20),
    )
}

/// Tier that keeps only the first `keep` bytes of every write and still reports
/// success, like a backend that silently truncates on overflow.
pub struct TruncatingTier {
    inner: MemoryTier,
    keep: usize,
}

impl TruncatingTier {
    pub fn new(keep: usize) -> Self {
        Self {
            inner: MemoryTier::new(),
            keep,
        }
    }
}

#[async_trait]
impl Tier for TruncatingTier {
    async fn get(&self, key: &str) -> TierResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> TierResult<()> {
        let cut: String = value.chars().take(self.keep).collect();
        self.inner.set(key, &cut).await
    }

    async fn remove(&self, key: &str) -> TierResult<()> {
        self.inner.remove(key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
