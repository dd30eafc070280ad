//! Memory Friction Gradient (MFG).
//!
//! `instant = clamp(0.6 × loadPressure + 0.4 × entropyPressure, 0, 1)`
//! `friction ← (1 − α) × friction + α × instant`
//!
//! Load pressure is last cycle's incoming load over the reference load;
//! entropy pressure is the entropy sum over the compression threshold.

use vault_core::config::FrictionConfig;

use crate::store::ScarStore;

const W_LOAD: f64 = 0.6;
const W_ENTROPY: f64 = 0.4;

/// Instantaneous friction for a store, in [0, 1].
pub fn instant_gradient(store: &ScarStore, config: &FrictionConfig, entropy_reference: f64) -> f64 {
    let load = if config.load_reference > 0.0 {
        (store.incoming_load_last_cycle() as f64 / config.load_reference).min(1.0)
    } else {
        0.0
    };
    let entropy = if entropy_reference > 0.0 {
        (store.entropy_sum() / entropy_reference).min(1.0)
    } else {
        0.0
    };
    (W_LOAD * load + W_ENTROPY * entropy).clamp(0.0, 1.0)
}

/// Fold the instantaneous gradient into the store's moving average. Returns the new value.
pub fn update(store: &mut ScarStore, config: &FrictionConfig, entropy_reference: f64) -> f64 {
    let instant = instant_gradient(store, config, entropy_reference);
    let alpha = config.ema_alpha.clamp(0.0, 1.0);
    let next = (1.0 - alpha) * store.friction_metric() + alpha * instant;
    store.set_friction_metric(next);
    store.friction_metric()
}
