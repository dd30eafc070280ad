//! Phase 2: Composite compaction.
//!
//! Clusters active scars with the injected clusterer. Each small, low-entropy
//! cluster is replaced by one synthesized latent-pattern scar. A bad cluster
//! is logged and skipped, never aborting the pass.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vault_core::config::OptimizationConfig;
use vault_core::constants::COMPACTION_RESOLVER;
use vault_core::errors::VaultResult;
use vault_core::models::Tombstone;
use vault_core::traits::{IScarArchive, IScarClusterer};
use vault_core::Scar;
use vault_observability::tracing_setup::events;
use vault_retention::eligibility::is_compaction_cluster;
use vault_store::ScarStore;

use super::compaction::synthesize_latent;
use super::PhaseContext;

/// Mapping from compacted scars to the latent scar that replaced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionRecord {
    pub source_ids: Vec<String>,
    pub latent_id: String,
    pub avg_post_entropy: f64,
}

pub fn run(
    store: &mut ScarStore,
    ctx: &PhaseContext,
    config: &OptimizationConfig,
    clusterer: &dyn IScarClusterer,
    archive: Option<&Arc<dyn IScarArchive>>,
) -> VaultResult<Vec<CompactionRecord>> {
    let ids = store.active_ids();
    let clusters = {
        let scars: Vec<&Scar> = ids.iter().filter_map(|id| store.get(id)).collect();
        match clusterer.cluster(&scars) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    vault = %ctx.vault_id,
                    clusterer = clusterer.name(),
                    error = %e,
                    "clustering failed, compaction skipped"
                );
                return Ok(vec![]);
            }
        }
    };

    let mut records = Vec::new();
    for (cluster_idx, cluster) in clusters.iter().enumerate() {
        match compact_cluster(store, ctx, config, &ids, cluster, archive) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    vault = %ctx.vault_id,
                    cluster = cluster_idx,
                    error = %e,
                    "compaction of cluster failed, skipped"
                );
            }
        }
    }
    Ok(records)
}

fn compact_cluster(
    store: &mut ScarStore,
    ctx: &PhaseContext,
    config: &OptimizationConfig,
    ids: &[String],
    cluster: &[usize],
    archive: Option<&Arc<dyn IScarArchive>>,
) -> VaultResult<Option<CompactionRecord>> {
    let unique: BTreeSet<usize> = cluster.iter().copied().collect();
    if unique.len() != cluster.len() || unique.iter().any(|&i| i >= ids.len()) {
        tracing::warn!(vault = %ctx.vault_id, ?cluster, "malformed cluster ignored");
        return Ok(None);
    }

    // Members consumed by an earlier cluster are no longer present.
    let members: Vec<&Scar> = unique
        .iter()
        .filter_map(|&i| store.get(&ids[i]))
        .filter(|s| s.is_active())
        .collect();
    if members.len() != unique.len() {
        return Ok(None);
    }

    let avg_post = members.iter().map(|s| s.post_entropy).sum::<f64>() / members.len() as f64;
    if !is_compaction_cluster(
        avg_post,
        members.len(),
        config.low_entropy_cluster_cutoff,
        config.max_compaction_cluster_size,
    ) {
        return Ok(None);
    }

    let latent = synthesize_latent(&members, ctx.vault_id, COMPACTION_RESOLVER);
    let latent_id = latent.scar_id.clone();
    let source_ids: Vec<String> = members.iter().map(|s| s.scar_id.clone()).collect();

    if let Some(archive) = archive {
        for member in &members {
            let mut stitched = (*member).clone();
            stitched.stitched_into = Some(latent_id.clone());
            archive.write_tombstone(&Tombstone::new(&stitched, ctx.vault_id, ctx.cycle, "compacted"))?;
        }
    }

    let removed: Vec<Scar> = source_ids.iter().filter_map(|id| store.remove(id)).collect();
    if let Err(e) = store.insert(latent) {
        for original in removed {
            store.insert(original)?;
        }
        return Err(e);
    }

    events::scars_compacted(&source_ids, &latent_id, ctx.vault_id, ctx.cycle);
    Ok(Some(CompactionRecord { source_ids, latent_id, avg_post_entropy: avg_post }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::VaultId;

    struct AllInOne;

    impl IScarClusterer for AllInOne {
        fn cluster(&self, scars: &[&Scar]) -> VaultResult<Vec<Vec<usize>>> {
            Ok(vec![(0..scars.len()).collect()])
        }
        fn name(&self) -> &str {
            "all"
        }
    }

    fn ctx() -> PhaseContext {
        PhaseContext { vault_id: VaultId::A, cycle: 4, pass_number: 1, grace_passes: 1 }
    }

    #[test]
    fn low_entropy_cluster_is_replaced_by_latent() {
        let mut store = ScarStore::new(VaultId::A, 10);
        for _ in 0..3 {
            store.insert(Scar::new(["g"], "r", 0.3, 0.2, 10.0, 0.0, VaultId::A)).unwrap();
        }
        let records = run(&mut store, &ctx(), &OptimizationConfig::default(), &AllInOne, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_ids.len(), 3);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&records[0].latent_id));
        assert!((store.entropy_sum() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn high_entropy_cluster_is_left_alone() {
        let mut store = ScarStore::new(VaultId::A, 10);
        for _ in 0..3 {
            store.insert(Scar::new(["g"], "r", 0.3, 0.9, 10.0, 0.0, VaultId::A)).unwrap();
        }
        let records = run(&mut store, &ctx(), &OptimizationConfig::default(), &AllInOne, None).unwrap();
        assert!(records.is_empty());
        assert_eq!(store.len(), 3);
    }
}
