//! Wedvite Core Library
//!
//! This crate provides the invitation record model, the media codec, error types
//! and configuration shared by the storage tiers, the record stores and the CLI.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use codec::{compress, decompress, payload_len, MediaCodec};
pub use config::{Config, TierConfig};
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
pub use models::{
    CommitOutcome, InvitationRecord, SaveOutcome, StorageReport, StorageUsage, SweepReport,
    TierReport,
};
pub use storage_types::{StorageBackend, TierKind};
