use serde::{Deserialize, Serialize};

use super::defaults;

/// Specialized vault variant parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    /// Grace passes before a fossil vault prunes low-priority scars.
    pub fossil_grace_passes: u32,
    /// Contradiction score above which the contradiction vault mutates a scar.
    pub contradiction_mutation_score: f64,
    /// Maximum absolute perturbation per expression feature.
    pub contradiction_mutation_amplitude: f64,
    /// Expression overlap above which the reactor vault fuses a pair.
    pub expression_overlap_threshold: f64,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            fossil_grace_passes: defaults::DEFAULT_FOSSIL_GRACE_PASSES,
            contradiction_mutation_score: defaults::DEFAULT_CONTRADICTION_MUTATION_SCORE,
            contradiction_mutation_amplitude: defaults::DEFAULT_CONTRADICTION_MUTATION_AMPLITUDE,
            expression_overlap_threshold: defaults::DEFAULT_EXPRESSION_OVERLAP_THRESHOLD,
        }
    }
}
