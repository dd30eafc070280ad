//! Phase 3: Reindexing.
//!
//! Rebuilds the secondary indices and checks the active count against what
//! phases 1 and 2 expect. A mismatch is fatal to the pass.

use vault_core::errors::VaultResult;
use vault_store::{ReindexReport, ScarStore};

/// Active count the pass expects after pruning and compaction.
pub fn expected_active(before: usize, pruned: usize, compacted_sources: usize, latents: usize) -> usize {
    (before + latents).saturating_sub(pruned + compacted_sources)
}

pub fn run(store: &mut ScarStore, expected_active: usize) -> VaultResult<ReindexReport> {
    let report = store.reindex(expected_active)?;
    tracing::debug!(
        vault = %report.vault_id,
        entries = report.entries,
        active = report.active,
        "reindex complete"
    );
    Ok(report)
}
