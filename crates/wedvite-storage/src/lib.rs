//! Wedvite Storage Library
//!
//! This crate provides the key-value `Tier` abstraction the record stores sit on,
//! with a local filesystem backend and an in-memory backend.
//!
//! # Tier model
//!
//! A tier holds a handful of string blobs, each under one key. The record stores
//! use exactly one key per tier and rewrite the whole blob on every save, so a
//! backend only needs `get`, `set` and `remove`.
//!
//! Keys must be non-empty, must not contain `..` or a leading `/`, and are limited
//! to letters, digits, `_`, `-` and `.`. Validation lives in the `keys` module so
//! all backends agree.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "tier-local")]
pub mod local;
#[cfg(feature = "tier-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_tier, create_tiers, TierPair};
#[cfg(feature = "tier-local")]
pub use local::LocalTier;
#[cfg(feature = "tier-memory")]
pub use memory::MemoryTier;
pub use traits::{Tier, TierError, TierResult};
pub use wedvite_core::StorageBackend;
