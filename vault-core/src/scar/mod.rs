pub mod base;
pub mod expression;
pub mod validation;
pub mod vault_id;

pub use base::{QuarantinePolicy, RetentionSignals, Scar};
pub use expression::{CompressedSummary, Expression};
pub use validation::validate;
pub use vault_id::VaultId;
