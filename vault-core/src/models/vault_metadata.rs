use serde::{Deserialize, Serialize};

use crate::scar::VaultId;

/// Read-only snapshot of a vault's aggregate counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultMetadata {
    pub vault_id: VaultId,
    /// Lifetime count of scars ever inserted.
    pub total_scars: u64,
    /// Scars currently active (not quarantined, not stitched).
    pub active_scars: usize,
    pub entropy_sum: f64,
    pub avg_cls_angle: f64,
    /// Memory Friction Gradient, in [0, 1].
    pub friction_metric: f64,
    pub incoming_load_last_cycle: u64,
    pub outgoing_load_last_cycle: u64,
    /// Mutation generation at snapshot time.
    pub generation: u64,
}
