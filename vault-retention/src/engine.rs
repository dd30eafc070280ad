use vault_core::config::RetentionConfig;
use vault_core::Scar;

use crate::formula::{self, IrsBreakdown};

/// Retention verdict with metadata for audit logging.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionDecision {
    pub scar_id: String,
    pub irs: f64,
    pub retained: bool,
    pub cutoff: f64,
    pub reason: String,
}

/// Scores scars and flags those below the IRS cutoff.
///
/// Flagging only: removal is the optimization engine's decision.
#[derive(Debug, Clone)]
pub struct RetentionScorer {
    cutoff: f64,
    epsilon: f64,
}

impl RetentionScorer {
    pub fn new(cutoff: f64, epsilon: f64) -> Self {
        Self { cutoff, epsilon }
    }

    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(config.irs_cutoff, config.irs_epsilon)
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn score(&self, scar: &Scar) -> f64 {
        formula::compute(scar, self.epsilon)
    }

    pub fn breakdown(&self, scar: &Scar) -> IrsBreakdown {
        formula::compute_breakdown(scar, self.epsilon)
    }

    pub fn is_retained(&self, irs: f64) -> bool {
        irs >= self.cutoff
    }

    pub fn evaluate(&self, scar: &Scar) -> RetentionDecision {
        let irs = self.score(scar);
        let retained = self.is_retained(irs);
        let reason = if retained {
            "irs at or above cutoff".to_string()
        } else {
            format!("irs {:.4} below cutoff {:.4}", irs, self.cutoff)
        };
        RetentionDecision {
            scar_id: scar.scar_id.clone(),
            irs,
            retained,
            cutoff: self.cutoff,
            reason,
        }
    }

    pub fn evaluate_batch<'a, I>(&self, scars: I) -> Vec<RetentionDecision>
    where
        I: IntoIterator<Item = &'a Scar>,
    {
        scars.into_iter().map(|s| self.evaluate(s)).collect()
    }
}

impl Default for RetentionScorer {
    fn default() -> Self {
        Self::from_config(&RetentionConfig::default())
    }
}
