//! SQLite persistence: snapshots survive reopen, range queries, the
//! tombstone archive, and the audit log.

use std::sync::Arc;

use chrono::{Duration, Utc};
use vault_core::models::{AuditOperation, AuditRecord, Tombstone};
use vault_core::traits::IScarArchive;
use vault_core::{QuarantinePolicy, Scar, VaultConfig, VaultId};
use vault_manager::VaultManager;
use vault_storage::migrations::LATEST_VERSION;
use vault_storage::SqliteVaultStorage;
use vault_store::ScarStore;

fn scar_at(angle: f64, minutes_ago: i64) -> Scar {
    Scar::new(["g"], "conflict", 0.5, 0.25, angle, 0.0, VaultId::A)
        .with_created_at(Utc::now() - Duration::minutes(minutes_ago))
}

fn populated(vault: VaultId) -> ScarStore {
    let mut store = ScarStore::new(vault, 100);
    for i in 0..6 {
        store.insert(scar_at(i as f64 * 30.0, 60 - i * 10)).unwrap();
    }
    store
}

#[test]
fn fresh_database_is_migrated() {
    let storage = SqliteVaultStorage::open_in_memory().unwrap();
    assert_eq!(storage.schema_version().unwrap(), LATEST_VERSION);
}

#[test]
fn vault_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vaults.db");

    let mut store = populated(VaultId::B);
    let mut quarantined = scar_at(200.0, 0).with_id("quiet");
    quarantined.quarantine = Some(QuarantinePolicy::Quarantine);
    store.insert(quarantined).unwrap();
    store.scale_entropy(0.5);
    store.set_friction_metric(0.35);
    let before = store.metadata();

    {
        let storage = SqliteVaultStorage::open(&path).unwrap();
        assert!(storage.is_wal().unwrap());
        assert_eq!(storage.save_vault(&store).unwrap(), 7);
    }

    let storage = SqliteVaultStorage::open(&path).unwrap();
    assert_eq!(storage.schema_version().unwrap(), LATEST_VERSION);
    let loaded = storage.load_vault(VaultId::B, 100).unwrap();
    assert_eq!(loaded.len(), 7);
    assert_eq!(loaded.active_count(), 6);
    assert!((loaded.entropy_sum() - before.entropy_sum).abs() < 1e-12);
    assert_eq!(loaded.friction_metric(), 0.35);
    assert!(loaded.get("quiet").unwrap().is_quarantined());
    assert_eq!(loaded.vault_id(), VaultId::B);
}

#[test]
fn save_replaces_previous_snapshot() {
    let storage = SqliteVaultStorage::open_in_memory().unwrap();
    let mut store = populated(VaultId::A);
    storage.save_vault(&store).unwrap();

    let victim = store.active_ids()[0].clone();
    store.remove(&victim);
    storage.save_vault(&store).unwrap();

    assert_eq!(storage.scar_count(VaultId::A).unwrap(), 5);
    assert!(storage.get_scar(&victim).unwrap().is_none());
    assert_eq!(storage.scar_count(VaultId::B).unwrap(), 0);
}

#[test]
fn unsaved_vault_loads_empty() {
    let storage = SqliteVaultStorage::open_in_memory().unwrap();
    let store = storage.load_vault(VaultId::A, 10).unwrap();
    assert!(store.is_empty());
    assert!(storage.metadata(VaultId::A).unwrap().is_none());
}

#[test]
fn range_queries_match_the_in_memory_index() {
    let storage = SqliteVaultStorage::open_in_memory().unwrap();
    let store = populated(VaultId::A);
    storage.save_vault(&store).unwrap();

    let persisted: Vec<f64> = storage
        .scars_in_angle_range(VaultId::A, 30.0, 90.0)
        .unwrap()
        .iter()
        .map(|s| s.cls_angle)
        .collect();
    let in_memory: Vec<f64> = store.scars_in_angle_range(30.0, 90.0).iter().map(|s| s.cls_angle).collect();
    assert_eq!(persisted, vec![30.0, 60.0, 90.0]);
    assert_eq!(persisted, in_memory);

    let from = Utc::now() - Duration::minutes(35);
    let recent = storage.scars_created_between(VaultId::A, from, Utc::now()).unwrap();
    assert_eq!(recent.len(), 3);
    assert!(recent.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    assert!(storage
        .scars_in_angle_range(VaultId::B, 0.0, 360.0)
        .unwrap()
        .is_empty());
}

#[test]
fn tombstones_record_stitching() {
    let storage = SqliteVaultStorage::open_in_memory().unwrap();
    let mut folded = scar_at(10.0, 0).with_id("src-1");
    folded.stitched_into = Some("latent-1".into());
    storage
        .write_tombstone(&Tombstone::new(&folded, VaultId::A, 4, "compacted"))
        .unwrap();
    storage
        .write_tombstone(&Tombstone::new(&scar_at(20.0, 0).with_id("gone"), VaultId::A, 4, "drift_collapse"))
        .unwrap();

    let all = storage.tombstones().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].scar_id, "src-1");
    assert_eq!(all[1].reason, "drift_collapse");
    assert_eq!(storage.stitched_sources("latent-1").unwrap(), vec!["src-1".to_string()]);
}

#[test]
fn audit_log_is_durable_and_per_vault() {
    let storage = SqliteVaultStorage::open_in_memory().unwrap();
    let records = vec![
        AuditRecord::new(AuditOperation::Prune, VaultId::A, 1).with_ids(vec!["x".into()], vec![]),
        AuditRecord::new(AuditOperation::Compress, VaultId::B, 1),
        AuditRecord::new(AuditOperation::PassSummary, VaultId::A, 1),
    ];
    assert_eq!(storage.append_audit(&records).unwrap(), 3);

    let a = storage.audit_records(VaultId::A).unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(a[0].operation, AuditOperation::Prune);
    assert_eq!(a[0].scar_ids_before, vec!["x".to_string()]);
    assert_eq!(storage.audit_count(AuditOperation::Compress.as_str()).unwrap(), 1);
}

#[test]
fn manager_archives_pruned_scars_and_restarts_from_snapshot() {
    let storage = Arc::new(SqliteVaultStorage::open_in_memory().unwrap());
    let mut config = VaultConfig::default();
    config.optimization.drift_fraction_threshold = 0.0;

    let manager = VaultManager::new(config.clone())
        .unwrap()
        .with_archive(storage.clone());
    let collapsed = Scar::new(["g"], "r", 0.5, 0.1, 0.0, 0.8, VaultId::A)
        .with_id("collapsed")
        .with_drift(20, false, 0.0);
    manager.insert(collapsed).unwrap();
    manager
        .insert(Scar::new(["h"], "r", 0.5, 0.1, 0.0, 0.8, VaultId::A).with_id("kept"))
        .unwrap();
    manager.run_cycle().unwrap();

    assert_eq!(manager.scar_location("collapsed").unwrap(), None);
    let tombstones = storage.tombstones().unwrap();
    assert!(tombstones.iter().any(|t| t.scar_id == "collapsed"));

    manager.with_store(VaultId::A, |s| storage.save_vault(s)).unwrap().unwrap();
    manager.with_store(VaultId::B, |s| storage.save_vault(s)).unwrap().unwrap();
    storage.append_audit(manager.audit_trail().unwrap().records()).unwrap();

    let a = storage.load_vault(VaultId::A, 100).unwrap();
    let b = storage.load_vault(VaultId::B, 100).unwrap();
    let restarted = VaultManager::from_stores(config, a, b).unwrap();
    assert_eq!(restarted.scar_location("kept").unwrap(), Some(VaultId::A));
    assert!(!storage.audit_records(VaultId::A).unwrap().is_empty());
}
