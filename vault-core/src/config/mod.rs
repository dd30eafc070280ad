pub mod capacity_config;
pub mod defaults;
pub mod fracture_config;
pub mod friction_config;
pub mod observability_config;
pub mod optimization_config;
pub mod retention_config;
pub mod routing_config;
pub mod variant_config;

pub use capacity_config::CapacityConfig;
pub use fracture_config::FractureConfig;
pub use friction_config::FrictionConfig;
pub use observability_config::ObservabilityConfig;
pub use optimization_config::OptimizationConfig;
pub use retention_config::RetentionConfig;
pub use routing_config::RoutingConfig;
pub use variant_config::VariantConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, VaultResult};

/// Top-level engine configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub routing: RoutingConfig,
    pub friction: FrictionConfig,
    pub fracture: FractureConfig,
    pub optimization: OptimizationConfig,
    pub retention: RetentionConfig,
    pub capacity: CapacityConfig,
    pub variants: VariantConfig,
    pub observability: ObservabilityConfig,
}

impl VaultConfig {
    /// Parse a (possibly partial) TOML document and validate the result.
    pub fn from_toml(source: &str) -> VaultResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values outside their meaningful domain.
    pub fn validate(&self) -> VaultResult<()> {
        check_unit("routing.mf_threshold_high", self.routing.mf_threshold_high)?;
        check_unit(
            "routing.semantic_polarity_threshold",
            self.routing.semantic_polarity_threshold,
        )?;
        check_non_negative(
            "routing.entropy_balance_threshold",
            self.routing.entropy_balance_threshold,
        )?;
        check_non_negative(
            "routing.cls_angle_proximity_deg",
            self.routing.cls_angle_proximity_deg,
        )?;

        check_unit("friction.mfg_threshold", self.friction.mfg_threshold)?;
        check_unit("friction.ema_alpha", self.friction.ema_alpha)?;
        if self.friction.load_reference <= 0.0 || !self.friction.load_reference.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "friction.load_reference".to_string(),
                reason: "must be a positive number".to_string(),
            }
            .into());
        }
        if self.friction.resolved_ticket_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "friction.resolved_ticket_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        check_unit(
            "fracture.vsi_fracture_threshold",
            self.fracture.vsi_fracture_threshold,
        )?;
        check_unit("fracture.vsi_stress_threshold", self.fracture.vsi_stress_threshold)?;
        if self.fracture.vsi_stress_threshold > self.fracture.vsi_fracture_threshold {
            return Err(ConfigError::InvalidValue {
                key: "fracture.vsi_stress_threshold".to_string(),
                reason: "must not exceed vsi_fracture_threshold".to_string(),
            }
            .into());
        }
        if self.fracture.isolation_cycles == 0 {
            return Err(ConfigError::InvalidValue {
                key: "fracture.isolation_cycles".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.fracture.fallback_throttle_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "fracture.fallback_throttle_rate".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        check_unit(
            "fracture.quarantine_idi_threshold",
            self.fracture.quarantine_idi_threshold,
        )?;
        check_unit("fracture.suspend_idi_threshold", self.fracture.suspend_idi_threshold)?;
        if self.fracture.suspend_idi_threshold < self.fracture.quarantine_idi_threshold {
            return Err(ConfigError::InvalidValue {
                key: "fracture.suspend_idi_threshold".to_string(),
                reason: "must not be below quarantine_idi_threshold".to_string(),
            }
            .into());
        }

        check_unit(
            "optimization.drift_fraction_threshold",
            self.optimization.drift_fraction_threshold,
        )?;
        check_unit(
            "optimization.thread_overlap_threshold",
            self.optimization.thread_overlap_threshold,
        )?;
        check_unit(
            "optimization.memory_usage_threshold",
            self.optimization.memory_usage_threshold,
        )?;
        check_non_negative(
            "optimization.compression_entropy_threshold",
            self.optimization.compression_entropy_threshold,
        )?;
        if self.optimization.entropy_history_window < 2 {
            return Err(ConfigError::InvalidValue {
                key: "optimization.entropy_history_window".to_string(),
                reason: "must hold at least 2 samples".to_string(),
            }
            .into());
        }

        check_non_negative("retention.irs_cutoff", self.retention.irs_cutoff)?;
        if self.retention.irs_epsilon <= 0.0 || !self.retention.irs_epsilon.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "retention.irs_epsilon".to_string(),
                reason: "must be a positive number".to_string(),
            }
            .into());
        }

        if self.capacity.max_active_per_shard == 0 || self.capacity.symbolic_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "capacity".to_string(),
                reason: "capacities must be at least 1".to_string(),
            }
            .into());
        }

        check_unit(
            "variants.expression_overlap_threshold",
            self.variants.expression_overlap_threshold,
        )?;
        check_non_negative(
            "variants.contradiction_mutation_amplitude",
            self.variants.contradiction_mutation_amplitude,
        )?;

        Ok(())
    }
}

fn check_unit(key: &str, value: f64) -> VaultResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("{value} is outside [0, 1]"),
        }
        .into())
    }
}

fn check_non_negative(key: &str, value: f64) -> VaultResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("{value} must be a finite non-negative number"),
        }
        .into())
    }
}
