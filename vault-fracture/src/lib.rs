//! # vault-fracture
//!
//! Fracture Controller. Tracks a Vault Stress Index per vault and drives
//! `Stable → Stressed → Fractured → Isolated → Recovering → Stable`.
//! Also screens scars for identity divergence and echo friction, and
//! migrates the fallback backlog home at a throttled rate.

pub mod backlog;
pub mod controller;
pub mod probe;
pub mod quarantine;

pub use backlog::{FallbackBacklog, MigrationReport};
pub use controller::FractureController;
pub use probe::CompositeStressProbe;
