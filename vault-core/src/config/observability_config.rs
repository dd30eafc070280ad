use serde::{Deserialize, Serialize};

use super::defaults;

/// Logging and audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter used when `VAULT_LOG` is unset.
    pub log_level: String,
    /// Audit records retained in memory by the manager.
    pub audit_trail_capacity: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            audit_trail_capacity: defaults::DEFAULT_AUDIT_TRAIL_CAPACITY,
        }
    }
}
