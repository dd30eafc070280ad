use serde::{Deserialize, Serialize};

use super::defaults;

/// Routing decision thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Mutation frequency above which a scar always targets vault A.
    pub mf_threshold_high: f64,
    /// Absolute polarity above which the polarity sign picks the vault.
    pub semantic_polarity_threshold: f64,
    /// Entropy difference between vaults that forces lower-entropy routing.
    pub entropy_balance_threshold: f64,
    /// Angular distance (degrees) to the target's average angle that bypasses friction delay.
    pub cls_angle_proximity_deg: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            mf_threshold_high: defaults::DEFAULT_MF_THRESHOLD_HIGH,
            semantic_polarity_threshold: defaults::DEFAULT_SEMANTIC_POLARITY_THRESHOLD,
            entropy_balance_threshold: defaults::DEFAULT_ENTROPY_BALANCE_THRESHOLD,
            cls_angle_proximity_deg: defaults::DEFAULT_CLS_ANGLE_PROXIMITY_DEG,
        }
    }
}
