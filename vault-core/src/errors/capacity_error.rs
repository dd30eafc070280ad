use crate::scar::VaultId;

/// A vault has reached its configured active-scar limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("vault {vault} is full: {active} active scars, limit {limit}")]
    VaultFull {
        vault: VaultId,
        active: usize,
        limit: usize,
    },
}
