//! Per-cycle report returned by `VaultManager::run_cycle`.

use serde::{Deserialize, Serialize};
use vault_core::models::{FractureTransition, QuarantineEvent, TicketStatus};
use vault_core::{FractureState, VaultId};
use vault_fracture::MigrationReport;
use vault_optimization::PassReport;

use crate::variants::VariantReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    /// Fracture state of each vault at the end of the cycle.
    pub fracture_states: Vec<(VaultId, FractureState)>,
    pub transitions: Vec<FractureTransition>,
    /// Delayed inserts resolved this cycle, by ticket.
    pub committed: Vec<(u64, TicketStatus)>,
    pub migrations: Vec<MigrationReport>,
    pub quarantined: Vec<QuarantineEvent>,
    pub passes: Vec<PassReport>,
    pub variants: Vec<VariantReport>,
}

impl CycleReport {
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            fracture_states: vec![],
            transitions: vec![],
            committed: vec![],
            migrations: vec![],
            quarantined: vec![],
            passes: vec![],
            variants: vec![],
        }
    }

    pub fn pass(&self, vault: VaultId) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.vault_id == vault)
    }

    pub fn fracture_state(&self, vault: VaultId) -> Option<FractureState> {
        self.fracture_states
            .iter()
            .find(|(v, _)| *v == vault)
            .map(|(_, s)| *s)
    }
}
