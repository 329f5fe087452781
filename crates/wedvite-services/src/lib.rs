//! Wedvite Services Library
//!
//! The quota-aware invitation record store:
//! - `CapacityMonitor`: bytes used per tier against an assumed ceiling
//! - `DurableStore`: the permanent record list, capacity-checked and verified on write
//! - `TransientStore`: the session staging list, with durable fallback and commit
//! - `RetentionSweeper`: age-based eviction from the durable tier
//! - `InvitationPersistence`: one handle tying the above together
//!
//! # Concurrency
//!
//! Every save is load-all, mutate, save-all on a single blob per tier. Nothing
//! serializes concurrent callers: two interleaved saves on the same tier are
//! last-write-wins and the earlier save's changes are lost. Callers must not race
//! themselves.

pub mod binding;
pub mod capacity;
pub mod durable;
pub mod persistence;
pub mod sweeper;
pub mod transient;

// Re-export commonly used types
pub use binding::TierBinding;
pub use capacity::CapacityMonitor;
pub use durable::DurableStore;
pub use persistence::InvitationPersistence;
pub use sweeper::RetentionSweeper;
pub use transient::TransientStore;
