//! Default Vault Stress Index composition.

use vault_core::traits::{IStressProbe, StressSignals};

const W_FRICTION: f64 = 0.5;
const W_ENTROPY_SLOPE: f64 = 0.3;
const W_THREAD_OVERLAP: f64 = 0.2;

/// `vsi = 0.5·friction + 0.3·clamp(entropy_slope, 0, 1) + 0.2·thread_overlap`, clamped to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeStressProbe;

impl IStressProbe for CompositeStressProbe {
    fn measure(&self, signals: &StressSignals) -> f64 {
        let slope = signals.entropy_slope.clamp(0.0, 1.0);
        let vsi = W_FRICTION * signals.friction.clamp(0.0, 1.0)
            + W_ENTROPY_SLOPE * slope
            + W_THREAD_OVERLAP * signals.thread_overlap.clamp(0.0, 1.0);
        if vsi.is_finite() {
            vsi.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
