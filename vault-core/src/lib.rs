//! # vault-core
//!
//! Foundation crate for the dual-vault scar memory engine.
//! Defines the Scar model, config, errors, models, and collaborator traits.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod scar;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::VaultConfig;
pub use errors::{VaultError, VaultResult};
pub use models::{FractureState, InsertOutcome, VaultMetadata};
pub use scar::{Expression, QuarantinePolicy, Scar, VaultId};
