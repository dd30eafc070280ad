use serde::{Deserialize, Serialize};

use super::defaults;

/// Per-vault capacity limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Hard cap on active scars per vault; inserts beyond it are rejected.
    pub max_active_per_shard: usize,
    /// Symbolic capacity used for the memory-usage trigger.
    pub symbolic_capacity: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            max_active_per_shard: defaults::DEFAULT_MAX_ACTIVE_PER_SHARD,
            symbolic_capacity: defaults::DEFAULT_SYMBOLIC_CAPACITY,
        }
    }
}
