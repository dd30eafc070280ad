use serde::{Deserialize, Serialize};

use super::defaults;

/// Fracture controller and quarantine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FractureConfig {
    /// VSI above which a vault fractures.
    pub vsi_fracture_threshold: f64,
    /// VSI above which a stable vault is considered stressed.
    pub vsi_stress_threshold: f64,
    /// Cycles a fractured vault stays isolated.
    pub isolation_cycles: u32,
    /// Backlog scars migrated back per cycle while recovering.
    pub fallback_throttle_rate: usize,
    /// IDI above which a scar is quarantined.
    pub quarantine_idi_threshold: f64,
    /// IDI above which a scar is suspended entirely.
    pub suspend_idi_threshold: f64,
    /// Echo friction below which a scar is flagged for quarantine review.
    pub echo_friction_threshold: f64,
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            vsi_fracture_threshold: defaults::DEFAULT_VSI_FRACTURE_THRESHOLD,
            vsi_stress_threshold: defaults::DEFAULT_VSI_STRESS_THRESHOLD,
            isolation_cycles: defaults::DEFAULT_FRACTURE_ISOLATION_CYCLES,
            fallback_throttle_rate: defaults::DEFAULT_FALLBACK_THROTTLE_RATE,
            quarantine_idi_threshold: defaults::DEFAULT_DIVERGENCE_QUARANTINE_IDI,
            suspend_idi_threshold: defaults::DEFAULT_DIVERGENCE_SUSPEND_IDI,
            echo_friction_threshold: defaults::DEFAULT_ECHO_FRICTION_THRESHOLD,
        }
    }
}
