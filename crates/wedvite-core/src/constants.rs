//! Application-wide constants.

/// Storage key of the durable invitation list.
pub const DURABLE_KEY: &str = "wedding_invitations";

/// Storage key of the transient (session) invitation list.
pub const TRANSIENT_KEY: &str = "wedding_invitations_temp";

/// Assumed per-tier ceiling. This approximates the usual browser quota and is not
/// a limit reported by any platform; override it through configuration.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// A tier above this percentage of its ceiling is critical.
pub const CRITICAL_THRESHOLD_PERCENT: f64 = 90.0;

/// Age threshold for a regular retention sweep.
pub const RETENTION_DAYS: u32 = 30;

/// Age threshold applied when a sweep is forced or the durable tier is critical.
pub const FORCED_RETENTION_DAYS: u32 = 7;

pub const IMAGE_MIME_HINT: &str = "image/jpeg";
pub const AUDIO_MIME_HINT: &str = "audio/mpeg";
