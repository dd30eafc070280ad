use serde::{Deserialize, Serialize};

use crate::scar::VaultId;

/// Action taken by quarantine screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineAction {
    Quarantine,
    Suspend,
    /// Echo friction dropped below threshold; flagged, still active.
    Review,
}

/// Event delivered to the suspension-layer collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineEvent {
    pub scar_id: String,
    pub vault_id: VaultId,
    pub idi: f64,
    pub action: QuarantineAction,
    pub reason: String,
    pub cycle: u64,
}
