//! Phase 4: Retention scoring.
//!
//! Marks active scars whose IRS falls below the cutoff as low priority, and
//! clears the mark from scars that have recovered. Marked scars become pruning
//! candidates once their grace period expires.

use serde::{Deserialize, Serialize};
use vault_core::errors::VaultResult;
use vault_retention::RetentionScorer;
use vault_store::ScarStore;

use super::PhaseContext;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionMarks {
    pub marked: Vec<String>,
    pub cleared: Vec<String>,
}

pub fn run(store: &mut ScarStore, ctx: &PhaseContext, scorer: &RetentionScorer) -> VaultResult<RetentionMarks> {
    let mut marks = RetentionMarks::default();
    let mut changes: Vec<(String, Option<u64>)> = Vec::new();

    for scar in store.active_scars() {
        let retained = scorer.is_retained(scorer.score(scar));
        match (retained, scar.low_priority_since) {
            (false, None) => {
                changes.push((scar.scar_id.clone(), Some(ctx.pass_number)));
                marks.marked.push(scar.scar_id.clone());
            }
            (true, Some(_)) => {
                changes.push((scar.scar_id.clone(), None));
                marks.cleared.push(scar.scar_id.clone());
            }
            _ => {}
        }
    }

    for (scar_id, since) in changes {
        store.update(&scar_id, |s| s.low_priority_since = since)?;
    }

    marks.marked.sort();
    marks.cleared.sort();
    Ok(marks)
}
