use serde::{Deserialize, Serialize};

use crate::scar::VaultId;

/// Per-vault inputs available to a stress probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressSignals {
    pub vault_id: VaultId,
    pub cycle: u64,
    pub friction: f64,
    pub entropy_slope: f64,
    pub thread_overlap: f64,
    pub active_scars: usize,
}

/// Produces the Vault Stress Index (VSI) in [0, 1].
pub trait IStressProbe: Send + Sync {
    fn measure(&self, signals: &StressSignals) -> f64;
}
