//! Data models
//!
//! The invitation record itself plus the small report types returned by the
//! record stores.

mod invitation;
mod storage;

pub use invitation::*;
pub use storage::*;
