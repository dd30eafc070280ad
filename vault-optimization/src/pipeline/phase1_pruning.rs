//! Phase 1: Drift collapse pruning.
//!
//! Removes active scars with deep lineage, no active loop and no goal impact,
//! plus low-priority scars whose grace period has run out while still below
//! the retention cutoff. Each removal is archived first when an archive exists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vault_core::config::OptimizationConfig;
use vault_core::errors::VaultResult;
use vault_core::models::Tombstone;
use vault_core::traits::IScarArchive;
use vault_observability::tracing_setup::events;
use vault_retention::eligibility::{grace_expired, is_drift_collapsed};
use vault_retention::RetentionScorer;
use vault_store::ScarStore;

use super::PhaseContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneReason {
    DriftCollapse,
    RetentionExpired,
}

impl PruneReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DriftCollapse => "drift_collapse",
            Self::RetentionExpired => "retention_expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrunedScar {
    pub scar_id: String,
    pub reason: PruneReason,
}

/// Decide whether a scar should be pruned in this pass.
pub fn prune_reason(
    scar: &vault_core::Scar,
    ctx: &PhaseContext,
    config: &OptimizationConfig,
    scorer: &RetentionScorer,
) -> Option<PruneReason> {
    if !scar.is_active() {
        return None;
    }
    if is_drift_collapsed(scar, config.drift_depth_threshold) {
        return Some(PruneReason::DriftCollapse);
    }
    if grace_expired(scar, ctx.pass_number, ctx.grace_passes)
        && !scorer.is_retained(scorer.score(scar))
    {
        return Some(PruneReason::RetentionExpired);
    }
    None
}

/// Run the pruning phase. Per-scar archive failures keep the scar and are logged.
pub fn run(
    store: &mut ScarStore,
    ctx: &PhaseContext,
    config: &OptimizationConfig,
    scorer: &RetentionScorer,
    archive: Option<&Arc<dyn IScarArchive>>,
) -> VaultResult<Vec<PrunedScar>> {
    let mut candidates: Vec<PrunedScar> = store
        .active_scars()
        .filter_map(|s| {
            prune_reason(s, ctx, config, scorer).map(|reason| PrunedScar {
                scar_id: s.scar_id.clone(),
                reason,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.scar_id.cmp(&b.scar_id));

    let mut pruned = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(archive) = archive {
            let Some(scar) = store.get(&candidate.scar_id) else {
                continue;
            };
            let tombstone = Tombstone::new(scar, ctx.vault_id, ctx.cycle, candidate.reason.as_str());
            if let Err(e) = archive.write_tombstone(&tombstone) {
                tracing::warn!(
                    scar_id = %candidate.scar_id,
                    vault = %ctx.vault_id,
                    error = %e,
                    "tombstone write failed, scar kept"
                );
                continue;
            }
        }

        if store.remove(&candidate.scar_id).is_some() {
            events::scar_pruned(&candidate.scar_id, ctx.vault_id, ctx.cycle, candidate.reason.as_str());
            pruned.push(candidate);
        }
    }

    Ok(pruned)
}
