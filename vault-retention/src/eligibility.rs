//! Eviction eligibility predicates.

use vault_core::Scar;

/// Drift collapse: deep lineage, no active loop, no goal impact.
pub fn is_drift_collapsed(scar: &Scar, depth_threshold: u32) -> bool {
    scar.drift_depth > depth_threshold && !scar.loop_active && scar.goal_impact == 0.0
}

/// A cluster qualifies for composite compaction when it is small and low-entropy.
pub fn is_compaction_cluster(
    avg_post_entropy: f64,
    size: usize,
    entropy_cutoff: f64,
    max_size: usize,
) -> bool {
    size >= 2 && size < max_size && avg_post_entropy < entropy_cutoff
}

/// A low-priority scar may be pruned once it has survived `grace_passes` passes.
pub fn grace_expired(scar: &Scar, current_pass: u64, grace_passes: u32) -> bool {
    match scar.low_priority_since {
        Some(marked) => current_pass.saturating_sub(marked) >= u64::from(grace_passes),
        None => false,
    }
}

/// Whether the scar has deep drift (counted by the drift-depth trigger).
pub fn has_deep_drift(scar: &Scar, depth_threshold: u32) -> bool {
    scar.drift_depth > depth_threshold
}
