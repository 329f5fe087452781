//! Configuration module
//!
//! Settings for the two storage tiers, the capacity heuristics and the retention
//! sweeper. Values come from the environment (and a `.env` file when present);
//! anything unset falls back to the defaults in `constants`.

use std::env;
use std::path::PathBuf;

use crate::codec::MediaCodec;
use crate::constants::{
    AUDIO_MIME_HINT, CRITICAL_THRESHOLD_PERCENT, DEFAULT_QUOTA_BYTES, DURABLE_KEY,
    FORCED_RETENTION_DAYS, IMAGE_MIME_HINT, RETENTION_DAYS, TRANSIENT_KEY,
};
use crate::storage_types::{StorageBackend, TierKind};

const DATA_DIR: &str = "./.wedvite";

/// Settings for one storage tier
#[derive(Clone, Debug)]
pub struct TierConfig {
    pub backend: StorageBackend,
    /// Key the serialized record list is stored under
    pub key: String,
    /// Assumed ceiling used by the capacity monitor
    pub quota_bytes: u64,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    /// Root directory for the local backend; each tier gets a sub-directory
    pub data_dir: PathBuf,
    pub durable: TierConfig,
    pub transient: TierConfig,
    pub critical_threshold_percent: f64,
    pub retention_days: u32,
    pub forced_retention_days: u32,
    /// Make tier backends reject writes larger than `quota_bytes`, the way a
    /// browser storage area throws on quota overflow
    pub enforce_tier_quota: bool,
    pub image_mime_hint: String,
    pub audio_mime_hint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            data_dir: PathBuf::from(DATA_DIR),
            durable: TierConfig {
                backend: StorageBackend::Local,
                key: DURABLE_KEY.to_string(),
                quota_bytes: DEFAULT_QUOTA_BYTES,
            },
            transient: TierConfig {
                backend: StorageBackend::Local,
                key: TRANSIENT_KEY.to_string(),
                quota_bytes: DEFAULT_QUOTA_BYTES,
            },
            critical_threshold_percent: CRITICAL_THRESHOLD_PERCENT,
            retention_days: RETENTION_DAYS,
            forced_retention_days: FORCED_RETENTION_DAYS,
            enforce_tier_quota: true,
            image_mime_hint: IMAGE_MIME_HINT.to_string(),
            audio_mime_hint: AUDIO_MIME_HINT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let defaults = Config::default();

        let parse_backend = |name: &str| -> Result<StorageBackend, anyhow::Error> {
            match lookup(name) {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
                None => Ok(StorageBackend::Local),
            }
        };

        let config = Config {
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or(defaults.environment),
            data_dir: lookup("WEDVITE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            durable: TierConfig {
                backend: parse_backend("DURABLE_BACKEND")?,
                key: lookup("DURABLE_KEY").unwrap_or(defaults.durable.key),
                quota_bytes: lookup("DURABLE_QUOTA_BYTES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.durable.quota_bytes),
            },
            transient: TierConfig {
                backend: parse_backend("TRANSIENT_BACKEND")?,
                key: lookup("TRANSIENT_KEY").unwrap_or(defaults.transient.key),
                quota_bytes: lookup("TRANSIENT_QUOTA_BYTES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.transient.quota_bytes),
            },
            critical_threshold_percent: lookup("CRITICAL_THRESHOLD_PERCENT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.critical_threshold_percent),
            retention_days: lookup("RETENTION_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retention_days),
            forced_retention_days: lookup("FORCED_RETENTION_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.forced_retention_days),
            enforce_tier_quota: lookup("ENFORCE_TIER_QUOTA")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enforce_tier_quota),
            image_mime_hint: lookup("IMAGE_MIME_HINT").unwrap_or(defaults.image_mime_hint),
            audio_mime_hint: lookup("AUDIO_MIME_HINT").unwrap_or(defaults.audio_mime_hint),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (kind, tier) in [
            (TierKind::Durable, &self.durable),
            (TierKind::Transient, &self.transient),
        ] {
            if tier.quota_bytes == 0 {
                return Err(anyhow::anyhow!("{} tier quota must be greater than zero", kind));
            }
            if tier.key.trim().is_empty() {
                return Err(anyhow::anyhow!("{} tier key must not be empty", kind));
            }
        }

        if self.durable.key == self.transient.key {
            return Err(anyhow::anyhow!(
                "DURABLE_KEY and TRANSIENT_KEY must differ (both are '{}')",
                self.durable.key
            ));
        }

        if !(self.critical_threshold_percent > 0.0 && self.critical_threshold_percent <= 100.0) {
            return Err(anyhow::anyhow!(
                "CRITICAL_THRESHOLD_PERCENT must be in (0, 100], got {}",
                self.critical_threshold_percent
            ));
        }

        if self.forced_retention_days == 0 {
            return Err(anyhow::anyhow!("FORCED_RETENTION_DAYS must be at least 1"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn tier(&self, kind: TierKind) -> &TierConfig {
        match kind {
            TierKind::Durable => &self.durable,
            TierKind::Transient => &self.transient,
        }
    }

    /// Directory the local backend uses for the given tier.
    pub fn tier_dir(&self, kind: TierKind) -> PathBuf {
        match kind {
            TierKind::Durable => self.data_dir.join("durable"),
            TierKind::Transient => self.data_dir.join("session"),
        }
    }

    pub fn codec(&self) -> MediaCodec {
        MediaCodec::new(self.image_mime_hint.clone(), self.audio_mime_hint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.durable.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.critical_threshold_percent, 90.0);
        assert_eq!(config.durable.key, "wedding_invitations");
        assert_eq!(config.transient.key, "wedding_invitations_temp");
        assert_eq!(config.forced_retention_days, 7);
        assert!(!config.is_production());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DURABLE_BACKEND", "memory"),
            ("TRANSIENT_QUOTA_BYTES", "2048"),
            ("CRITICAL_THRESHOLD_PERCENT", "75.5"),
            ("ENVIRONMENT", "Production"),
            ("WEDVITE_DATA_DIR", "/tmp/wedvite"),
        ]))
        .unwrap();
        assert_eq!(config.durable.backend, StorageBackend::Memory);
        assert_eq!(config.transient.backend, StorageBackend::Local);
        assert_eq!(config.transient.quota_bytes, 2048);
        assert_eq!(config.critical_threshold_percent, 75.5);
        assert!(config.is_production());
        assert_eq!(
            config.tier_dir(TierKind::Transient),
            PathBuf::from("/tmp/wedvite/session")
        );
    }

    #[test]
    fn invalid_backend_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("TRANSIENT_BACKEND", "s3")])).unwrap_err();
        assert!(err.to_string().contains("TRANSIENT_BACKEND"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.durable.quota_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.critical_threshold_percent = 120.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transient.key = config.durable.key.clone();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.forced_retention_days = 0;
        assert!(config.validate().is_err());
    }
}
