use serde::{Deserialize, Serialize};

use super::defaults;

/// Optimization engine triggers and pass parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Lineage depth beyond which a scar counts as deep drift.
    pub drift_depth_threshold: u32,
    /// Fraction of active scars with deep drift that triggers a pass.
    pub drift_fraction_threshold: f64,
    /// New scars within the density window that trigger a pass.
    pub scar_density_threshold: usize,
    /// Cycles covered by the density window.
    pub density_window_cycles: u64,
    /// Entropy increase over the history window that triggers a pass.
    pub entropy_slope_threshold: f64,
    /// Cycles of entropy history retained.
    pub entropy_history_window: usize,
    /// Identity-thread overlap fraction that triggers a pass.
    pub thread_overlap_threshold: f64,
    /// Fraction of symbolic capacity in use that triggers a pass.
    pub memory_usage_threshold: f64,
    /// Clusters with average post-entropy below this are compacted.
    pub low_entropy_cluster_cutoff: f64,
    /// Clusters must be strictly smaller than this to be compacted.
    pub max_compaction_cluster_size: usize,
    /// Vault entropy sum above which one scar is compressed each cycle.
    pub compression_entropy_threshold: f64,
    /// Features retained by a compressed expression.
    pub compression_keep_features: usize,
    /// Seed for tie-breaking and mutation randomness. None = entropy-seeded.
    pub rng_seed: Option<u64>,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            drift_depth_threshold: defaults::DEFAULT_DRIFT_DEPTH_THRESHOLD,
            drift_fraction_threshold: defaults::DEFAULT_DRIFT_FRACTION_THRESHOLD,
            scar_density_threshold: defaults::DEFAULT_SCAR_DENSITY_THRESHOLD,
            density_window_cycles: defaults::DEFAULT_DENSITY_WINDOW_CYCLES,
            entropy_slope_threshold: defaults::DEFAULT_ENTROPY_SLOPE_THRESHOLD,
            entropy_history_window: defaults::DEFAULT_ENTROPY_HISTORY_WINDOW,
            thread_overlap_threshold: defaults::DEFAULT_THREAD_OVERLAP_THRESHOLD,
            memory_usage_threshold: defaults::DEFAULT_MEMORY_USAGE_THRESHOLD,
            low_entropy_cluster_cutoff: defaults::DEFAULT_LOW_ENTROPY_CLUSTER_CUTOFF,
            max_compaction_cluster_size: defaults::DEFAULT_MAX_COMPACTION_CLUSTER_SIZE,
            compression_entropy_threshold: defaults::DEFAULT_COMPRESSION_ENTROPY_THRESHOLD,
            compression_keep_features: defaults::DEFAULT_COMPRESSION_KEEP_FEATURES,
            rng_seed: None,
        }
    }
}
