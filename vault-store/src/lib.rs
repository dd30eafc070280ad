//! # vault-store
//!
//! The Scar Store: one vault's indexed scar collection plus aggregate
//! counters (entropy sum, average CLS angle, load, friction).
//! Lookups by id, CLS angle range, and creation time range.

pub mod friction;
pub mod index;
pub mod store;

pub use index::ScarIndex;
pub use store::{ReindexReport, ScarStore};
