//! Maintenance triggers: drift depth, scar density, entropy slope,
//! identity-thread overlap, memory usage.

use serde::{Deserialize, Serialize};
use vault_core::config::OptimizationConfig;

/// Reasons a maintenance pass should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    /// Too many active scars carry deep lineage.
    DriftDepth,
    /// Too many scars arrived within the density window.
    ScarDensity,
    /// Entropy is climbing across the history window.
    EntropySlope,
    /// Active scars are piling onto the same identity threads.
    ThreadOverlap,
    /// Symbolic capacity is nearly exhausted.
    MemoryUsage,
}

impl TriggerReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DriftDepth => "drift_depth",
            Self::ScarDensity => "scar_density",
            Self::EntropySlope => "entropy_slope",
            Self::ThreadOverlap => "thread_overlap",
            Self::MemoryUsage => "memory_usage",
        }
    }
}

/// Input signals for trigger evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerSignals {
    /// Fraction of active scars whose drift depth exceeds the threshold (0.0–1.0).
    pub deep_drift_fraction: f64,
    /// Scars inserted within the density window.
    pub recent_insertions: u64,
    /// Entropy change across the history window.
    pub entropy_slope: f64,
    /// Fraction of active scars sharing a geoid with another active scar.
    pub thread_overlap: f64,
    /// Active scars as a fraction of symbolic capacity.
    pub memory_usage: f64,
}

/// Evaluate whether a pass should run.
/// Returns the list of active trigger reasons (empty = no trigger).
pub fn evaluate_triggers(signals: &TriggerSignals, config: &OptimizationConfig) -> Vec<TriggerReason> {
    let mut reasons = Vec::new();

    if signals.deep_drift_fraction > config.drift_fraction_threshold {
        reasons.push(TriggerReason::DriftDepth);
    }

    if signals.recent_insertions > config.scar_density_threshold as u64 {
        reasons.push(TriggerReason::ScarDensity);
    }

    if signals.entropy_slope > config.entropy_slope_threshold {
        reasons.push(TriggerReason::EntropySlope);
    }

    if signals.thread_overlap > config.thread_overlap_threshold {
        reasons.push(TriggerReason::ThreadOverlap);
    }

    if signals.memory_usage > config.memory_usage_threshold {
        reasons.push(TriggerReason::MemoryUsage);
    }

    reasons
}
