use serde::{Deserialize, Serialize};

use super::defaults;

/// Influence-based retention scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Minimum IRS for a scar to be retained.
    pub irs_cutoff: f64,
    /// Floor applied to the entropy-decay denominator.
    pub irs_epsilon: f64,
    /// Maintenance passes a low-priority scar survives before pruning.
    pub grace_passes: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            irs_cutoff: defaults::DEFAULT_IRS_CUTOFF,
            irs_epsilon: defaults::DEFAULT_IRS_EPSILON,
            grace_passes: defaults::DEFAULT_RETENTION_GRACE_PASSES,
        }
    }
}
