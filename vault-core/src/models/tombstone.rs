use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scar::{Scar, VaultId};

/// Archive record written before a scar is hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tombstone {
    pub scar_id: String,
    pub vault_id: VaultId,
    pub cycle: u64,
    pub reason: String,
    /// Full scar as it was at deletion time.
    pub scar: Scar,
    pub removed_at: DateTime<Utc>,
}

impl Tombstone {
    pub fn new(scar: &Scar, vault_id: VaultId, cycle: u64, reason: impl Into<String>) -> Self {
        Self {
            scar_id: scar.scar_id.clone(),
            vault_id,
            cycle,
            reason: reason.into(),
            scar: scar.clone(),
            removed_at: Utc::now(),
        }
    }
}
