//! Routing decision for incoming scars.
//!
//! Order: entropy-balance override, mutation frequency, semantic polarity,
//! lower entropy (ties toward A).

use serde::{Deserialize, Serialize};
use vault_core::config::RoutingConfig;
use vault_core::{Scar, VaultId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRule {
    /// Entropy gap between the vaults exceeds the balance threshold.
    EntropyBalance,
    MutationFrequency,
    SemanticPolarity,
    LowerEntropy,
}

impl RouteRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntropyBalance => "entropy_balance",
            Self::MutationFrequency => "mutation_frequency",
            Self::SemanticPolarity => "semantic_polarity",
            Self::LowerEntropy => "lower_entropy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub target: VaultId,
    pub rule: RouteRule,
}

fn lower_entropy(entropy_a: f64, entropy_b: f64) -> VaultId {
    if entropy_b < entropy_a {
        VaultId::B
    } else {
        VaultId::A
    }
}

/// Pick the target vault. Deterministic in the scar and the two entropy sums.
pub fn route(scar: &Scar, entropy_a: f64, entropy_b: f64, config: &RoutingConfig) -> RouteDecision {
    if (entropy_a - entropy_b).abs() > config.entropy_balance_threshold {
        return RouteDecision {
            target: lower_entropy(entropy_a, entropy_b),
            rule: RouteRule::EntropyBalance,
        };
    }

    if scar.mutation_frequency.abs() > config.mf_threshold_high {
        return RouteDecision { target: VaultId::A, rule: RouteRule::MutationFrequency };
    }

    if scar.semantic_polarity.abs() > config.semantic_polarity_threshold {
        let target = if scar.semantic_polarity > 0.0 { VaultId::A } else { VaultId::B };
        return RouteDecision { target, rule: RouteRule::SemanticPolarity };
    }

    RouteDecision {
        target: lower_entropy(entropy_a, entropy_b),
        rule: RouteRule::LowerEntropy,
    }
}

/// Smallest angular distance in degrees.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Structural urgency: the scar's angle is close to the target vault's mean
/// angle. Requires the target to hold active scars.
pub fn priority_interrupt(scar: &Scar, target_active: usize, target_avg_angle: f64, config: &RoutingConfig) -> bool {
    target_active > 0 && angular_distance(scar.cls_angle, target_avg_angle) <= config.cls_angle_proximity_deg
}
