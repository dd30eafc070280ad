use vault_core::Scar;

/// Influence-Based Retention Score.
///
/// ```text
/// irs = (loopInfluence × goalContribution × anchorCoupling) / max(entropyDecay, ε)
/// ```
///
/// Absent inputs count as 0, so a scar with no signals scores 0.
pub fn compute(scar: &Scar, epsilon: f64) -> f64 {
    compute_breakdown(scar, epsilon).irs
}

/// Each IRS input, for audit details and debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct IrsBreakdown {
    pub loop_influence: f64,
    pub goal_contribution: f64,
    pub anchor_coupling: f64,
    pub entropy_decay: f64,
    /// The denominator actually used after the ε floor.
    pub denominator: f64,
    pub irs: f64,
}

pub fn compute_breakdown(scar: &Scar, epsilon: f64) -> IrsBreakdown {
    let signals = &scar.retention;
    let loop_influence = finite_or_zero(signals.loop_influence);
    let goal_contribution = finite_or_zero(signals.goal_contribution);
    let anchor_coupling = finite_or_zero(signals.anchor_coupling);
    let entropy_decay = finite_or_zero(signals.entropy_decay);

    let denominator = entropy_decay.max(epsilon.max(f64::MIN_POSITIVE));
    let irs = (loop_influence * goal_contribution * anchor_coupling) / denominator;

    IrsBreakdown {
        loop_influence,
        goal_contribution,
        anchor_coupling,
        entropy_decay,
        denominator,
        irs: if irs.is_finite() { irs } else { 0.0 },
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::scar::RetentionSignals;
    use vault_core::VaultId;

    fn scar(signals: RetentionSignals) -> Scar {
        Scar::new(["g"], "r", 0.1, 0.1, 0.0, 0.0, VaultId::A).with_retention(signals)
    }

    #[test]
    fn missing_signals_score_zero() {
        assert_eq!(compute(&scar(RetentionSignals::default()), 1e-6), 0.0);
    }

    #[test]
    fn zero_decay_uses_epsilon_floor() {
        let s = scar(RetentionSignals {
            loop_influence: Some(0.5),
            goal_contribution: Some(0.5),
            anchor_coupling: Some(0.5),
            entropy_decay: Some(0.0),
        });
        let b = compute_breakdown(&s, 0.01);
        assert_eq!(b.denominator, 0.01);
        assert!((b.irs - 12.5).abs() < 1e-9);
    }

    #[test]
    fn formula_matches_hand_calculation() {
        let s = scar(RetentionSignals {
            loop_influence: Some(0.8),
            goal_contribution: Some(0.5),
            anchor_coupling: Some(0.6),
            entropy_decay: Some(2.0),
        });
        assert!((compute(&s, 1e-6) - 0.12).abs() < 1e-9);
    }
}
