use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expression::Expression;
use super::vault_id::VaultId;

/// How strictly a quarantined scar is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantinePolicy {
    /// Removed from routing eligibility and active counts.
    Quarantine,
    /// Suspended entirely for downstream consumers as well.
    Suspend,
}

/// Inputs to the influence-based retention score. Absent values count as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionSignals {
    pub loop_influence: Option<f64>,
    pub goal_contribution: Option<f64>,
    pub anchor_coupling: Option<f64>,
    pub entropy_decay: Option<f64>,
}

/// A stored record of a detected and resolved knowledge contradiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scar {
    /// UUID v4 identifier, unique across both vaults.
    pub scar_id: String,
    /// Knowledge units involved. Weak references.
    pub geoid_refs: BTreeSet<String>,
    /// Free-text description of the conflict.
    pub reason: String,
    pub created_at: DateTime<Utc>,
    /// Module or process that resolved the conflict.
    pub resolved_by: String,
    pub pre_entropy: f64,
    pub post_entropy: f64,
    pub delta_entropy: f64,
    /// Collapse-line-shape torsion angle, degrees.
    pub cls_angle: f64,
    /// In [-1.0, 1.0].
    pub semantic_polarity: f64,
    /// Provenance. Never changed by routing.
    pub origin_vault: VaultId,
    /// Vault currently holding the scar. Changes only through migration.
    pub current_vault: VaultId,
    pub expression: Expression,

    // --- Derived fields, updated by maintenance ---
    /// Lineage chain length.
    pub drift_depth: u32,
    pub loop_active: bool,
    pub goal_impact: f64,
    /// In [0, 100].
    pub contradiction_score: f64,
    pub mutation_frequency: f64,
    /// Identity Divergence Index.
    pub identity_divergence_index: f64,
    /// Set when consumed by a merge.
    pub stitched_into: Option<String>,
    #[serde(default)]
    pub retention: RetentionSignals,
    /// Echo friction score used for quarantine review.
    #[serde(default)]
    pub echo_friction: Option<f64>,

    // --- Lifecycle flags ---
    #[serde(default)]
    pub quarantine: Option<QuarantinePolicy>,
    #[serde(default)]
    pub review_flagged: bool,
    /// Maintenance pass that marked this scar below the retention cutoff.
    #[serde(default)]
    pub low_priority_since: Option<u64>,
}

impl Scar {
    /// Create a scar with the minimum upstream fields. Derived fields start at zero.
    pub fn new<I, S>(
        geoid_refs: I,
        reason: impl Into<String>,
        pre_entropy: f64,
        post_entropy: f64,
        cls_angle: f64,
        semantic_polarity: f64,
        origin_vault: VaultId,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scar_id: uuid::Uuid::new_v4().to_string(),
            geoid_refs: geoid_refs.into_iter().map(Into::into).collect(),
            reason: reason.into(),
            created_at: Utc::now(),
            resolved_by: String::new(),
            pre_entropy,
            post_entropy,
            delta_entropy: post_entropy - pre_entropy,
            cls_angle,
            semantic_polarity,
            origin_vault,
            current_vault: origin_vault,
            expression: Expression::default(),
            drift_depth: 0,
            loop_active: false,
            goal_impact: 0.0,
            contradiction_score: 0.0,
            mutation_frequency: 0.0,
            identity_divergence_index: 0.0,
            stitched_into: None,
            retention: RetentionSignals::default(),
            echo_friction: None,
            quarantine: None,
            review_flagged: false,
            low_priority_since: None,
        }
    }

    pub fn with_id(mut self, scar_id: impl Into<String>) -> Self {
        self.scar_id = scar_id.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_resolved_by(mut self, resolved_by: impl Into<String>) -> Self {
        self.resolved_by = resolved_by.into();
        self
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = expression;
        self
    }

    pub fn with_mutation_frequency(mut self, mutation_frequency: f64) -> Self {
        self.mutation_frequency = mutation_frequency;
        self
    }

    pub fn with_drift(mut self, drift_depth: u32, loop_active: bool, goal_impact: f64) -> Self {
        self.drift_depth = drift_depth;
        self.loop_active = loop_active;
        self.goal_impact = goal_impact;
        self
    }

    pub fn with_contradiction_score(mut self, score: f64) -> Self {
        self.contradiction_score = score;
        self
    }

    pub fn with_identity_divergence(mut self, idi: f64) -> Self {
        self.identity_divergence_index = idi;
        self
    }

    pub fn with_retention(mut self, retention: RetentionSignals) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_echo_friction(mut self, echo_friction: f64) -> Self {
        self.echo_friction = Some(echo_friction);
        self
    }

    /// Active scars count toward aggregates and are eligible for routing and maintenance.
    pub fn is_active(&self) -> bool {
        self.quarantine.is_none() && self.stitched_into.is_none()
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantine.is_some()
    }
}

/// Identity equality: two scars are equal if they share an id.
impl PartialEq for Scar {
    fn eq(&self, other: &Self) -> bool {
        self.scar_id == other.scar_id
    }
}
