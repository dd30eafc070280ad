//! # vault-retention
//!
//! Influence-Based Retention Score (IRS) and the eligibility predicates the
//! optimization engine uses to pick pruning and compaction candidates.
//! Pure functions: nothing here mutates or removes a scar.

pub mod eligibility;
pub mod engine;
pub mod formula;

pub use engine::{RetentionDecision, RetentionScorer};
pub use formula::IrsBreakdown;
