use serde::{Deserialize, Serialize};

use super::defaults;

/// Memory Friction Gradient configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrictionConfig {
    /// Friction above which inserts into a vault are delayed.
    pub mfg_threshold: f64,
    /// Maximum cycles an insert waits before being forced in.
    pub scar_delay_cycles: u32,
    /// Smoothing factor for the friction moving average.
    pub ema_alpha: f64,
    /// Inserts per cycle that count as full load pressure.
    pub load_reference: f64,
    /// Resolved delay tickets remembered for status lookups; oldest evicted first.
    pub resolved_ticket_capacity: usize,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            mfg_threshold: defaults::DEFAULT_MFG_THRESHOLD,
            scar_delay_cycles: defaults::DEFAULT_SCAR_DELAY_CYCLES,
            ema_alpha: defaults::DEFAULT_FRICTION_EMA_ALPHA,
            load_reference: defaults::DEFAULT_FRICTION_LOAD_REFERENCE,
            resolved_ticket_capacity: defaults::DEFAULT_RESOLVED_TICKET_CAPACITY,
        }
    }
}
