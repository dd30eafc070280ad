use std::sync::{Arc, Mutex};

use vault_core::errors::{StorageError, VaultResult};
use vault_core::models::{AuditOperation, Tombstone};
use vault_core::traits::{IScarArchive, IScarClusterer};
use vault_core::{Expression, Scar, VaultConfig, VaultId};
use vault_optimization::pipeline::phase1_pruning::PruneReason;
use vault_optimization::{OptimizationEngine, TriggerReason, VaultHistory};
use vault_store::ScarStore;

struct NoClusters;

impl IScarClusterer for NoClusters {
    fn cluster(&self, _scars: &[&Scar]) -> VaultResult<Vec<Vec<usize>>> {
        Ok(vec![])
    }
    fn name(&self) -> &str {
        "none"
    }
}

/// Clusters every scar whose reason starts with "c:".
struct ByReason;

impl IScarClusterer for ByReason {
    fn cluster(&self, scars: &[&Scar]) -> VaultResult<Vec<Vec<usize>>> {
        let cluster: Vec<usize> = scars
            .iter()
            .enumerate()
            .filter(|(_, s)| s.reason.starts_with("c:"))
            .map(|(i, _)| i)
            .collect();
        Ok(if cluster.len() >= 2 { vec![cluster] } else { vec![] })
    }
    fn name(&self) -> &str {
        "by_reason"
    }
}

#[derive(Default)]
struct MemoryArchive {
    tombstones: Mutex<Vec<Tombstone>>,
    fail: bool,
}

impl IScarArchive for MemoryArchive {
    fn write_tombstone(&self, tombstone: &Tombstone) -> VaultResult<()> {
        if self.fail {
            return Err(StorageError::SqliteError { message: "disk full".into() }.into());
        }
        self.tombstones.lock().unwrap().push(tombstone.clone());
        Ok(())
    }
}

fn config(symbolic_capacity: usize) -> VaultConfig {
    let mut config = VaultConfig::default();
    config.capacity.symbolic_capacity = symbolic_capacity;
    config.optimization.rng_seed = Some(42);
    config
}

fn scar(geoid: &str, post: f64) -> Scar {
    Scar::new([geoid], "r", post, post, 30.0, 0.0, VaultId::A)
        .with_expression(Expression::from_features([("f1", 0.5), ("f2", 0.25)]))
}

#[test]
fn entropy_six_compresses_to_three_with_one_scar_marked() {
    let engine = OptimizationEngine::new(&config(10_000)).with_clusterer(Box::new(NoClusters));
    let mut store = ScarStore::new(VaultId::A, 100);
    store.insert(scar("g1", 2.0)).unwrap();
    store.insert(scar("g2", 2.5)).unwrap();
    store.insert(scar("g3", 1.5)).unwrap();
    assert!((store.entropy_sum() - 6.0).abs() < 1e-12);

    let report = engine.run_cycle(&mut store, &mut VaultHistory::default(), 1);

    assert!(report.triggers.is_empty());
    assert!((store.entropy_sum() - 3.0).abs() < 1e-12);
    let compressed = store.scars().filter(|s| s.expression.is_compressed()).count();
    assert_eq!(compressed, 1);
    let outcome = report.compression.unwrap();
    assert!((outcome.entropy_before - 6.0).abs() < 1e-12);
    assert!((outcome.entropy_after - 3.0).abs() < 1e-12);
    assert_eq!(report.audit.iter().filter(|r| r.operation == AuditOperation::Compress).count(), 1);
}

#[test]
fn entropy_at_threshold_does_not_compress() {
    let engine = OptimizationEngine::new(&config(10_000)).with_clusterer(Box::new(NoClusters));
    let mut store = ScarStore::new(VaultId::A, 100);
    store.insert(scar("g1", 5.0)).unwrap();
    let report = engine.run_cycle(&mut store, &mut VaultHistory::default(), 1);
    assert!(report.compression.is_none());
    assert!((store.entropy_sum() - 5.0).abs() < 1e-12);
}

#[test]
fn memory_pressure_prunes_drift_collapsed_scars() {
    let engine = OptimizationEngine::new(&config(1)).with_clusterer(Box::new(NoClusters));
    let mut store = ScarStore::new(VaultId::A, 100);
    let collapsed = scar("g1", 0.1).with_drift(13, false, 0.0);
    let looping = scar("g2", 0.1).with_drift(13, true, 0.0);
    let shallow = scar("g3", 0.1).with_drift(12, false, 0.0);
    let collapsed_id = collapsed.scar_id.clone();
    for s in [collapsed, looping, shallow] {
        store.insert(s).unwrap();
    }

    let report = engine.run_cycle(&mut store, &mut VaultHistory::default(), 1);

    assert!(report.triggers.contains(&TriggerReason::MemoryUsage));
    assert_eq!(report.pruned.len(), 1);
    assert_eq!(report.pruned[0].scar_id, collapsed_id);
    assert_eq!(report.pruned[0].reason, PruneReason::DriftCollapse);
    assert!(!store.contains(&collapsed_id));
    assert_eq!(store.len(), 2);
    assert_eq!(report.reindex.unwrap().active, 2);
    assert!(report.audit.iter().any(|r| r.operation == AuditOperation::PassSummary));
}

#[test]
fn compaction_replaces_cluster_and_logs_mapping() {
    let engine = OptimizationEngine::new(&config(1)).with_clusterer(Box::new(ByReason));
    let mut store = ScarStore::new(VaultId::B, 100);
    let mut sources = Vec::new();
    for geoid in ["a", "b", "c"] {
        let mut s = scar(geoid, 0.2);
        s.reason = format!("c:{geoid}");
        sources.push(s.scar_id.clone());
        store.insert(s).unwrap();
    }
    store.insert(scar("z", 0.2)).unwrap();

    let report = engine.run_cycle(&mut store, &mut VaultHistory::default(), 3);

    assert_eq!(report.compactions.len(), 1);
    let record = &report.compactions[0];
    let mut mapped = record.source_ids.clone();
    mapped.sort();
    sources.sort();
    assert_eq!(mapped, sources);
    assert_eq!(store.len(), 2);
    let latent = store.get(&record.latent_id).unwrap();
    assert_eq!(latent.geoid_refs.len(), 3);
    assert_eq!(latent.resolved_by, "vault.compaction");

    let audit = report
        .audit
        .iter()
        .find(|r| r.operation == AuditOperation::Compact)
        .unwrap();
    assert_eq!(audit.scar_ids_after, vec![record.latent_id.clone()]);
}

#[test]
fn archive_receives_pruned_and_stitched_scars() {
    let archive = Arc::new(MemoryArchive::default());
    let engine = OptimizationEngine::new(&config(1))
        .with_clusterer(Box::new(ByReason))
        .with_archive(archive.clone());
    let mut store = ScarStore::new(VaultId::A, 100);
    let dead = scar("x", 0.1).with_drift(20, false, 0.0);
    let dead_id = dead.scar_id.clone();
    store.insert(dead).unwrap();
    for geoid in ["a", "b"] {
        let mut s = scar(geoid, 0.1);
        s.reason = format!("c:{geoid}");
        store.insert(s).unwrap();
    }

    let report = engine.run_cycle(&mut store, &mut VaultHistory::default(), 7);
    let latent_id = report.compactions[0].latent_id.clone();

    let tombstones = archive.tombstones.lock().unwrap();
    assert_eq!(tombstones.len(), 3);
    let pruned = tombstones.iter().find(|t| t.scar_id == dead_id).unwrap();
    assert_eq!(pruned.reason, "drift_collapse");
    assert_eq!(pruned.cycle, 7);
    let stitched: Vec<_> = tombstones.iter().filter(|t| t.reason == "compacted").collect();
    assert_eq!(stitched.len(), 2);
    assert!(stitched.iter().all(|t| t.scar.stitched_into.as_deref() == Some(latent_id.as_str())));
}

#[test]
fn archive_failure_keeps_the_scar() {
    let archive = Arc::new(MemoryArchive { fail: true, ..Default::default() });
    let engine = OptimizationEngine::new(&config(1))
        .with_clusterer(Box::new(NoClusters))
        .with_archive(archive);
    let mut store = ScarStore::new(VaultId::A, 100);
    let dead = scar("x", 0.1).with_drift(20, false, 0.0);
    let dead_id = dead.scar_id.clone();
    store.insert(dead).unwrap();

    let report = engine.run_cycle(&mut store, &mut VaultHistory::default(), 1);
    assert!(report.pruned.is_empty());
    assert!(report.aborted.is_none());
    assert!(store.contains(&dead_id));
}

#[test]
fn low_priority_scar_is_pruned_after_one_pass_of_grace() {
    let engine = OptimizationEngine::new(&config(1)).with_clusterer(Box::new(NoClusters));
    let mut store = ScarStore::new(VaultId::A, 100);
    let weak = scar("w", 0.1);
    let weak_id = weak.scar_id.clone();
    store.insert(weak).unwrap();
    let mut history = VaultHistory::default();

    let first = engine.run_cycle(&mut store, &mut history, 1);
    assert_eq!(first.low_priority.marked, vec![weak_id.clone()]);
    assert!(store.contains(&weak_id));

    let second = engine.run_cycle(&mut store, &mut history, 2);
    assert_eq!(second.pruned.len(), 1);
    assert_eq!(second.pruned[0].reason, PruneReason::RetentionExpired);
    assert!(!store.contains(&weak_id));
}

#[test]
fn longer_grace_delays_retention_pruning() {
    let engine = OptimizationEngine::new(&config(1)).with_clusterer(Box::new(NoClusters));
    let mut store = ScarStore::new(VaultId::A, 100);
    let weak = scar("w", 0.1);
    let weak_id = weak.scar_id.clone();
    store.insert(weak).unwrap();
    let mut history = VaultHistory::default();

    for cycle in 1..=3 {
        engine.run_cycle_with_grace(&mut store, &mut history, cycle, 3);
        assert!(store.contains(&weak_id), "pruned too early at cycle {cycle}");
    }
    engine.run_cycle_with_grace(&mut store, &mut history, 4, 3);
    assert!(!store.contains(&weak_id));
}

#[test]
fn rising_entropy_history_triggers_a_pass() {
    let engine = OptimizationEngine::new(&config(10_000)).with_clusterer(Box::new(NoClusters));
    let store = ScarStore::new(VaultId::A, 100);
    let mut history = VaultHistory::default();
    history.record_cycle(1, 0.0, 0);
    history.record_cycle(2, 0.5, 0);
    assert_eq!(engine.evaluate(&store, &history), vec![TriggerReason::EntropySlope]);
}

#[test]
fn insertion_density_triggers_a_pass() {
    let engine = OptimizationEngine::new(&config(10_000));
    let store = ScarStore::new(VaultId::A, 100);
    let mut history = VaultHistory::default();
    history.record_cycle(1, 0.0, 26);
    assert_eq!(engine.evaluate(&store, &history), vec![TriggerReason::ScarDensity]);
}
