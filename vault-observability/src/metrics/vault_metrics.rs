use serde::{Deserialize, Serialize};

use vault_core::VaultId;

/// Counters for one vault since startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMetrics {
    pub inserted: u64,
    pub delayed: u64,
    pub forced: u64,
    pub redirected: u64,
    pub rejected: u64,
    pub pruned: u64,
    pub compacted: u64,
    pub compressed: u64,
    pub quarantined: u64,
    pub migrated: u64,
    pub maintenance_passes: u64,
    pub aborted_passes: u64,
}

/// Metrics for both vaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsCollector {
    vaults: [VaultMetrics; 2],
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vault(&self, vault: VaultId) -> &VaultMetrics {
        &self.vaults[vault.index()]
    }

    pub fn vault_mut(&mut self, vault: VaultId) -> &mut VaultMetrics {
        &mut self.vaults[vault.index()]
    }

    /// Export as JSON for dashboards.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "A": self.vault(VaultId::A),
            "B": self.vault(VaultId::B),
        })
    }
}
