use serde::{Deserialize, Serialize};

use crate::scar::VaultId;

/// Per-vault structural stress state.
///
/// `Stable → Stressed → Fractured → Isolated → Recovering → Stable`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractureState {
    #[default]
    Stable,
    Stressed,
    Fractured,
    Isolated,
    Recovering,
}

impl FractureState {
    /// Isolated and fractured vaults accept no new inserts.
    pub fn accepts_inserts(self) -> bool {
        !matches!(self, FractureState::Fractured | FractureState::Isolated)
    }
}

/// A recorded state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractureTransition {
    pub vault_id: VaultId,
    pub from: FractureState,
    pub to: FractureState,
    pub cycle: u64,
    pub vsi: f64,
}
