#[cfg(feature = "tier-local")]
use crate::LocalTier;
#[cfg(feature = "tier-memory")]
use crate::MemoryTier;
use crate::{StorageBackend, Tier, TierError, TierResult};
use std::sync::Arc;
use wedvite_core::{Config, TierKind};

/// The durable and transient tiers built from one configuration.
#[derive(Clone)]
pub struct TierPair {
    pub durable: Arc<dyn Tier>,
    pub transient: Arc<dyn Tier>,
}

/// Create the backend for one tier based on configuration
pub async fn create_tier(config: &Config, kind: TierKind) -> TierResult<Arc<dyn Tier>> {
    let tier_config = config.tier(kind);
    let quota = config
        .enforce_tier_quota
        .then_some(tier_config.quota_bytes);

    match tier_config.backend {
        #[cfg(feature = "tier-local")]
        StorageBackend::Local => {
            let tier = LocalTier::new(config.tier_dir(kind), quota).await?;
            Ok(Arc::new(tier))
        }

        #[cfg(not(feature = "tier-local"))]
        StorageBackend::Local => Err(TierError::ConfigError(
            "Local tier backend not available (tier-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "tier-memory")]
        StorageBackend::Memory => {
            let tier = match quota {
                Some(limit) => MemoryTier::with_quota(limit),
                None => MemoryTier::new(),
            };
            Ok(Arc::new(tier))
        }

        #[cfg(not(feature = "tier-memory"))]
        StorageBackend::Memory => Err(TierError::ConfigError(
            "Memory tier backend not available (tier-memory feature not enabled)".to_string(),
        )),
    }
}

/// Create both tiers based on configuration
pub async fn create_tiers(config: &Config) -> TierResult<TierPair> {
    let durable = create_tier(config, TierKind::Durable).await?;
    let transient = create_tier(config, TierKind::Transient).await?;

    tracing::debug!(
        durable_backend = %durable.backend_type(),
        transient_backend = %transient.backend_type(),
        "Storage tiers created"
    );

    Ok(TierPair { durable, transient })
}
