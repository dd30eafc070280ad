//! Collects trigger signals from a store and its history.

use vault_core::config::OptimizationConfig;
use vault_retention::eligibility::has_deep_drift;
use vault_store::ScarStore;

use super::triggers::TriggerSignals;
use crate::history::VaultHistory;

pub fn collect_signals(
    store: &ScarStore,
    history: &VaultHistory,
    config: &OptimizationConfig,
    symbolic_capacity: usize,
) -> TriggerSignals {
    let active = store.active_count();
    let deep = store
        .active_scars()
        .filter(|s| has_deep_drift(s, config.drift_depth_threshold))
        .count();

    TriggerSignals {
        deep_drift_fraction: if active == 0 { 0.0 } else { deep as f64 / active as f64 },
        recent_insertions: history.recent_insertions(),
        entropy_slope: history.entropy_slope(),
        thread_overlap: store.thread_overlap(),
        memory_usage: if symbolic_capacity == 0 {
            0.0
        } else {
            active as f64 / symbolic_capacity as f64
        },
    }
}
