//! End-to-end tests for the dual-vault manager: routing, friction delay,
//! fracture redirects, quarantine, variants, and collaborator sinks.

use std::sync::{Arc, Mutex};

use vault_core::models::{AuditOperation, QuarantineAction, QuarantineEvent, RejectReason, TicketStatus};
use vault_core::errors::VaultResult;
use vault_core::traits::{IEntropySink, IQuarantineSink, IScarClusterer, IStressProbe, StressSignals};
use vault_core::{Expression, FractureState, InsertOutcome, Scar, VaultConfig, VaultId};
use vault_manager::variants::{CompressionVariant, ContradictionVariant, FossilVariant, ReactorVariant};
use vault_manager::{IVaultVariant, VariantKind, VaultManager};
use vault_optimization::TriggerReason;

// --- Helpers ---

fn scar(post_entropy: f64, polarity: f64) -> Scar {
    Scar::new(["g1"], "contradiction resolved", 0.0, post_entropy, 0.0, polarity, VaultId::A)
}

fn to_a(post_entropy: f64) -> Scar {
    scar(post_entropy, 0.8)
}

/// Config whose maintenance triggers never fire, so cycles only do what a
/// test asks for.
fn quiet_config() -> VaultConfig {
    let mut config = VaultConfig::default();
    config.optimization.drift_fraction_threshold = 1.0;
    config.optimization.scar_density_threshold = usize::MAX;
    config.optimization.entropy_slope_threshold = 1e9;
    config.optimization.thread_overlap_threshold = 1.0;
    config.optimization.memory_usage_threshold = 1.0;
    config
}

/// Reports a VSI per vault that the test can change between cycles.
#[derive(Clone, Default)]
struct SharedProbe {
    vsi: Arc<Mutex<[f64; 2]>>,
}

impl SharedProbe {
    fn set(&self, vault: VaultId, value: f64) {
        self.vsi.lock().unwrap()[vault.index()] = value;
    }
}

impl IStressProbe for SharedProbe {
    fn measure(&self, signals: &StressSignals) -> f64 {
        self.vsi.lock().unwrap()[signals.vault_id.index()]
    }
}

#[derive(Default)]
struct RecordingQuarantineSink {
    events: Mutex<Vec<QuarantineEvent>>,
}

impl IQuarantineSink for RecordingQuarantineSink {
    fn on_quarantine(&self, event: &QuarantineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Never groups scars, so maintenance passes skip compaction.
struct NoClusters;

impl IScarClusterer for NoClusters {
    fn cluster(&self, _scars: &[&Scar]) -> VaultResult<Vec<Vec<usize>>> {
        Ok(vec![])
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[derive(Default)]
struct RecordingEntropySink {
    changes: Mutex<Vec<(VaultId, f64, f64)>>,
}

impl IEntropySink for RecordingEntropySink {
    fn entropy_changed(&self, vault_id: VaultId, before: f64, after: f64, _cycle: u64) {
        self.changes.lock().unwrap().push((vault_id, before, after));
    }
}

// --- Routing ---

#[test]
fn high_mutation_frequency_scars_all_land_in_a() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    for i in 0..100 {
        let s = Scar::new([format!("g{i}")], "r", 0.0, 0.0, 0.0, 0.0, VaultId::B).with_mutation_frequency(0.9);
        let outcome = manager.insert(s).unwrap();
        assert_eq!(outcome.vault(), Some(VaultId::A));
    }
    assert_eq!(manager.get_status(VaultId::A).unwrap().active_scars, 100);
    assert_eq!(manager.get_status(VaultId::B).unwrap().active_scars, 0);
}

#[test]
fn negative_polarity_goes_to_b() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    let outcome = manager.insert(scar(0.1, -0.8)).unwrap();
    assert!(matches!(outcome, InsertOutcome::Accepted { vault: VaultId::B, redirected: false, .. }));
}

#[test]
fn entropy_imbalance_steers_to_the_calmer_vault() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    manager.insert(to_a(1.0)).unwrap();
    // Positive polarity would pick A, but A now carries 1.0 more entropy.
    let outcome = manager.insert(to_a(0.1)).unwrap();
    assert_eq!(outcome.vault(), Some(VaultId::B));
}

#[test]
fn scar_location_finds_the_holding_vault() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    let s = scar(0.1, -0.8).with_id("in-b");
    manager.insert(s).unwrap();
    assert_eq!(manager.scar_location("in-b").unwrap(), Some(VaultId::B));
    assert_eq!(manager.scar_location("nowhere").unwrap(), None);
}

// --- Rejections ---

#[test]
fn duplicate_ids_are_rejected_across_vaults() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    assert!(manager.insert(scar(0.1, -0.8).with_id("dup")).unwrap().is_accepted());

    let outcome = manager.insert(scar(0.1, 0.8).with_id("dup")).unwrap();
    assert_eq!(
        outcome,
        InsertOutcome::Rejected { reason: RejectReason::Duplicate { scar_id: "dup".into() } }
    );
    assert_eq!(manager.scar_location("dup").unwrap(), Some(VaultId::B));
}

#[test]
fn full_vault_rejects_with_capacity() {
    let mut config = VaultConfig::default();
    config.capacity.max_active_per_shard = 1;
    let manager = VaultManager::new(config).unwrap();

    assert!(manager.insert(to_a(0.0)).unwrap().is_accepted());
    let outcome = manager.insert(to_a(0.0)).unwrap();
    assert!(matches!(outcome, InsertOutcome::Rejected { reason: RejectReason::Capacity(_) }));
    assert_eq!(manager.metrics().unwrap().vault(VaultId::A).rejected, 1);
}

#[test]
fn malformed_scar_is_rejected_without_touching_stores() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    let outcome = manager.insert(scar(f64::NAN, 0.8)).unwrap();
    assert!(matches!(outcome, InsertOutcome::Rejected { reason: RejectReason::Validation(_) }));
    assert_eq!(manager.get_status(VaultId::A).unwrap().total_scars, 0);
    assert_eq!(manager.get_status(VaultId::B).unwrap().total_scars, 0);
}

#[test]
fn invalid_config_is_refused() {
    let mut config = VaultConfig::default();
    config.friction.mfg_threshold = 2.0;
    assert!(VaultManager::new(config).is_err());
}

// --- Quarantine ---

#[test]
fn divergent_scar_is_stored_but_not_active() {
    let sink = Arc::new(RecordingQuarantineSink::default());
    let manager = VaultManager::new(VaultConfig::default())
        .unwrap()
        .with_quarantine_sink(sink.clone());

    let outcome = manager.insert(to_a(0.1).with_identity_divergence(0.85).with_id("drifter")).unwrap();
    assert!(outcome.is_accepted());

    let status = manager.get_status(VaultId::A).unwrap();
    assert_eq!(status.active_scars, 0);
    assert!(manager.with_store(VaultId::A, |s| s.contains("drifter")).unwrap());

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, QuarantineAction::Suspend);
    assert_eq!(
        manager.audit_trail().unwrap().by_operation(AuditOperation::Quarantine).len(),
        1
    );
}

// --- Friction delay ---

#[test]
fn friction_delays_then_forces_after_configured_cycles() {
    let manager = VaultManager::new(quiet_config()).unwrap();
    manager.set_friction(VaultId::A, 0.9).unwrap();

    let outcome = manager.insert(to_a(0.1).with_id("late")).unwrap();
    let InsertOutcome::Delayed { ticket, target } = outcome else {
        panic!("expected delay, got {outcome:?}");
    };
    assert_eq!(target, VaultId::A);
    assert_eq!(
        manager.ticket_status(ticket).unwrap(),
        TicketStatus::Pending { target: VaultId::A, cycles_waited: 0 }
    );

    // Friction decays to 0.63 after the first cycle, still above 0.5.
    manager.run_cycle().unwrap();
    assert!(matches!(manager.ticket_status(ticket).unwrap(), TicketStatus::Pending { cycles_waited: 1, .. }));
    assert_eq!(manager.scar_location("late").unwrap(), None);

    let report = manager.run_cycle().unwrap();
    let accepted = TicketStatus::Accepted { scar_id: "late".into(), vault: VaultId::A };
    assert_eq!(report.committed, vec![(ticket, accepted.clone())]);
    assert_eq!(manager.ticket_status(ticket).unwrap(), accepted);
    assert_eq!(manager.scar_location("late").unwrap(), Some(VaultId::A));

    assert_eq!(manager.audit_trail().unwrap().by_operation(AuditOperation::ForcedInsert).len(), 1);
    let metrics = manager.metrics().unwrap();
    assert_eq!(metrics.vault(VaultId::A).delayed, 1);
    assert_eq!(metrics.vault(VaultId::A).forced, 1);
}

#[test]
fn delayed_scar_blocks_a_duplicate_insert() {
    let manager = VaultManager::new(quiet_config()).unwrap();
    manager.set_friction(VaultId::A, 0.9).unwrap();
    assert!(matches!(manager.insert(to_a(0.1).with_id("q")).unwrap(), InsertOutcome::Delayed { .. }));

    let outcome = manager.insert(to_a(0.1).with_id("q")).unwrap();
    assert!(matches!(outcome, InsertOutcome::Rejected { reason: RejectReason::Duplicate { .. } }));
    assert_eq!(manager.pending_inserts().unwrap(), 1);
}

#[test]
fn nearby_angle_bypasses_friction() {
    let manager = VaultManager::new(quiet_config()).unwrap();
    let anchor = Scar::new(["g"], "r", 0.0, 0.1, 100.0, 0.8, VaultId::A);
    manager.insert(anchor).unwrap();
    manager.set_friction(VaultId::A, 0.9).unwrap();

    let urgent = Scar::new(["g"], "r", 0.0, 0.1, 105.0, 0.8, VaultId::A);
    assert!(manager.insert(urgent).unwrap().is_accepted());

    let distant = Scar::new(["g"], "r", 0.0, 0.1, 200.0, 0.8, VaultId::A);
    assert!(matches!(manager.insert(distant).unwrap(), InsertOutcome::Delayed { .. }));
}

#[test]
fn nearby_angle_across_zero_bypasses_friction() {
    let manager = VaultManager::new(quiet_config()).unwrap();
    manager.insert(Scar::new(["g"], "r", 0.0, 0.05, 350.0, 0.8, VaultId::A)).unwrap();
    manager.insert(Scar::new(["g"], "r", 0.0, 0.05, 10.0, 0.8, VaultId::A)).unwrap();
    let avg = manager.get_status(VaultId::A).unwrap().avg_cls_angle;
    assert!(avg < 1e-9 || 360.0 - avg < 1e-9, "avg = {avg}");
    manager.set_friction(VaultId::A, 0.9).unwrap();

    let outcome = manager.insert(Scar::new(["g"], "r", 0.0, 0.05, 0.0, 0.8, VaultId::A)).unwrap();
    assert!(matches!(outcome, InsertOutcome::Accepted { vault: VaultId::A, .. }), "got {outcome:?}");

    let opposite = Scar::new(["g"], "r", 0.0, 0.05, 180.0, 0.8, VaultId::A);
    assert!(matches!(manager.insert(opposite).unwrap(), InsertOutcome::Delayed { .. }));
}

#[test]
fn unknown_ticket_reports_unknown() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    assert_eq!(manager.ticket_status(42).unwrap(), TicketStatus::Unknown);
}

// --- Fracture ---

#[test]
fn isolated_vault_redirects_then_migrates_home_on_recovery() {
    let probe = SharedProbe::default();
    let manager = VaultManager::new(quiet_config())
        .unwrap()
        .with_stress_probe(Box::new(probe.clone()));

    probe.set(VaultId::A, 0.9);
    let report = manager.run_cycle().unwrap();
    assert_eq!(report.fracture_state(VaultId::A), Some(FractureState::Isolated));
    assert_eq!(report.transitions.len(), 2);

    let outcome = manager.insert(to_a(0.1).with_id("displaced")).unwrap();
    assert_eq!(
        outcome,
        InsertOutcome::Accepted { scar_id: "displaced".into(), vault: VaultId::B, redirected: true }
    );
    assert_eq!(manager.backlog_len(VaultId::A).unwrap(), 1);

    probe.set(VaultId::A, 0.0);
    manager.run_cycle().unwrap();
    manager.run_cycle().unwrap();
    assert_eq!(manager.fracture_state(VaultId::A).unwrap(), FractureState::Isolated);

    let report = manager.run_cycle().unwrap();
    assert_eq!(report.migrations.len(), 1);
    assert_eq!(report.migrations[0].migrated, vec!["displaced".to_string()]);
    assert_eq!(manager.fracture_state(VaultId::A).unwrap(), FractureState::Stable);
    assert_eq!(manager.scar_location("displaced").unwrap(), Some(VaultId::A));
    assert_eq!(manager.backlog_len(VaultId::A).unwrap(), 0);

    let states: Vec<FractureState> = manager
        .transitions(VaultId::A)
        .unwrap()
        .iter()
        .map(|t| t.to)
        .collect();
    assert_eq!(
        states,
        vec![
            FractureState::Fractured,
            FractureState::Isolated,
            FractureState::Recovering,
            FractureState::Stable
        ]
    );
    assert_eq!(manager.audit_trail().unwrap().by_operation(AuditOperation::Migrate).len(), 1);
}

#[test]
fn both_vaults_isolated_queues_until_one_recovers() {
    let probe = SharedProbe::default();
    let manager = VaultManager::new(quiet_config())
        .unwrap()
        .with_stress_probe(Box::new(probe.clone()));

    probe.set(VaultId::A, 0.95);
    probe.set(VaultId::B, 0.95);
    manager.run_cycle().unwrap();
    probe.set(VaultId::A, 0.0);
    probe.set(VaultId::B, 0.0);

    let outcome = manager.insert(to_a(0.1).with_id("waiting")).unwrap();
    let InsertOutcome::Delayed { ticket, .. } = outcome else {
        panic!("expected delay, got {outcome:?}");
    };

    for _ in 0..3 {
        manager.run_cycle().unwrap();
        assert!(matches!(manager.ticket_status(ticket).unwrap(), TicketStatus::Pending { .. }));
    }

    manager.run_cycle().unwrap();
    assert_eq!(
        manager.ticket_status(ticket).unwrap(),
        TicketStatus::Accepted { scar_id: "waiting".into(), vault: VaultId::A }
    );
    assert_eq!(manager.pending_inserts().unwrap(), 0);
}

// --- Variants ---

#[test]
fn contradiction_vault_mutates_high_score_scars() {
    let config = quiet_config();
    let variant = ContradictionVariant::new(&config.variants, Some(11));
    let manager = VaultManager::new(config).unwrap().with_variant(VaultId::A, Box::new(variant));

    let hot = to_a(0.1)
        .with_id("hot")
        .with_contradiction_score(95.0)
        .with_expression(Expression::from_features([("x", 1.0), ("y", -0.5)]));
    let calm = to_a(0.1)
        .with_id("calm")
        .with_contradiction_score(10.0)
        .with_expression(Expression::from_features([("x", 1.0)]));
    manager.insert(hot).unwrap();
    manager.insert(calm).unwrap();

    let report = manager.run_cycle().unwrap();
    let variant = report.variants.iter().find(|v| v.kind == VariantKind::Contradiction).unwrap();
    assert_eq!(variant.mutated, vec!["hot".to_string()]);
    assert!(variant.entropy_delta >= 0.0);

    let post = manager.with_store(VaultId::A, |s| s.get("hot").unwrap().post_entropy).unwrap();
    assert!(post >= 0.1);
    assert!(post <= 0.1 + 0.05 + 1e-12);
    assert_eq!(manager.audit_trail().unwrap().by_operation(AuditOperation::Mutate).len(), 1);
}

#[test]
fn reactor_vault_synthesizes_once_per_pair() {
    let config = quiet_config();
    let variant = ReactorVariant::new(&config.variants);
    let manager = VaultManager::new(config).unwrap().with_variant(VaultId::B, Box::new(variant));

    let expression = Expression::from_features([("a", 1.0), ("b", 0.5)]);
    manager.insert(scar(0.1, -0.8).with_id("left").with_expression(expression.clone())).unwrap();
    manager.insert(scar(0.1, -0.8).with_id("right").with_expression(expression)).unwrap();

    let report = manager.run_cycle().unwrap();
    let reactor = report.variants.iter().find(|v| v.kind == VariantKind::Reactor).unwrap();
    assert_eq!(reactor.synthesized.len(), 1);
    assert_eq!(manager.get_status(VaultId::B).unwrap().active_scars, 3);
    let trail = manager.audit_trail().unwrap();
    assert_eq!(trail.by_operation(AuditOperation::Synthesize), reactor.audit.iter().collect::<Vec<_>>());
    let first = reactor.clone();

    let report = manager.run_cycle().unwrap();
    let reactor = report.variants.iter().find(|v| v.kind == VariantKind::Reactor).unwrap();
    assert!(reactor.synthesized.is_empty());
    assert_ne!(*reactor, first);
    assert_eq!(manager.get_status(VaultId::B).unwrap().active_scars, 3);
}

#[test]
fn compression_vault_compresses_below_threshold() {
    let manager = VaultManager::new(quiet_config())
        .unwrap()
        .with_variant(VaultId::A, Box::new(CompressionVariant));

    let features: Vec<(String, f64)> = (0..12).map(|i| (format!("f{i}"), i as f64 + 1.0)).collect();
    manager.insert(to_a(0.2).with_expression(Expression::from_features(features))).unwrap();

    let report = manager.run_cycle().unwrap();
    let compression = report.variants.iter().find(|v| v.kind == VariantKind::Compression).unwrap();
    let outcome = compression.compression.as_ref().unwrap();
    assert_eq!(outcome.features_before, 12);
    assert!((manager.get_status(VaultId::A).unwrap().entropy_sum - 0.1).abs() < 1e-9);
    assert_eq!(manager.metrics().unwrap().vault(VaultId::A).compressed, 1);
}

#[test]
fn fossil_vault_extends_pruning_grace() {
    let config = VaultConfig::default();
    let fossil = FossilVariant::new(&config.variants);
    assert_eq!(fossil.pruning_grace_passes(), Some(config.variants.fossil_grace_passes));
    assert_eq!(fossil.kind(), VariantKind::Fossil);

    let manager = VaultManager::new(quiet_config())
        .unwrap()
        .with_variant(VaultId::A, Box::new(fossil));
    manager.insert(to_a(0.1)).unwrap();
    let report = manager.run_cycle().unwrap();
    let fossil = report.variants.iter().find(|v| v.kind == VariantKind::Fossil).unwrap();
    assert!(fossil.mutated.is_empty() && fossil.synthesized.is_empty());
}

#[test]
fn overlapping_threads_are_marked_then_pruned_with_fossil_grace() {
    let config = VaultConfig::default();
    let fossil = FossilVariant::new(&config.variants);
    let manager = VaultManager::new(config)
        .unwrap()
        .with_clusterer(Box::new(NoClusters))
        .with_variant(VaultId::B, Box::new(fossil));

    // Every scar shares "g1" and carries no retention signals (IRS 0).
    // The entropy-balance rule alternates them between A and B.
    for id in ["a1", "b1", "a2", "b2"] {
        manager.insert(scar(0.5, 0.8).with_id(id)).unwrap();
    }
    for id in ["a1", "a2"] {
        assert_eq!(manager.scar_location(id).unwrap(), Some(VaultId::A));
    }
    for id in ["b1", "b2"] {
        assert_eq!(manager.scar_location(id).unwrap(), Some(VaultId::B));
    }

    // Pass 1: thread overlap fires, both vaults mark their scars low priority.
    let report = manager.run_cycle().unwrap();
    for vault in [VaultId::A, VaultId::B] {
        let pass = report.pass(vault).unwrap();
        assert!(pass.triggers.contains(&TriggerReason::ThreadOverlap));
        assert_eq!(pass.pass_number, Some(1));
        assert!(pass.pruned.is_empty());
        assert_eq!(pass.low_priority.marked.len(), 2);
    }
    assert_eq!(manager.get_status(VaultId::A).unwrap().active_scars, 2);

    // Pass 2: one pass of grace has expired in A; B is a fossil vault.
    let report = manager.run_cycle().unwrap();
    let pruned: Vec<&str> = report
        .pass(VaultId::A)
        .unwrap()
        .pruned
        .iter()
        .map(|p| p.scar_id.as_str())
        .collect();
    assert_eq!(pruned.len(), 2);
    assert!(pruned.contains(&"a1") && pruned.contains(&"a2"));
    assert!(report.pass(VaultId::B).unwrap().pruned.is_empty());
    assert_eq!(manager.get_status(VaultId::A).unwrap().active_scars, 0);
    assert_eq!(manager.scar_location("a1").unwrap(), None);
    assert!(!manager.audit_trail().unwrap().by_operation(AuditOperation::Prune).is_empty());

    // Nothing left to overlap in A, so no further passes there.
    let report = manager.run_cycle().unwrap();
    assert!(report.pass(VaultId::A).unwrap().triggers.is_empty());
    assert_eq!(manager.get_status(VaultId::B).unwrap().active_scars, 2);

    // Pass 4 in B: the three-pass fossil grace has run out.
    let report = manager.run_cycle().unwrap();
    let pass_b = report.pass(VaultId::B).unwrap();
    assert_eq!(pass_b.pass_number, Some(4));
    assert_eq!(pass_b.pruned.len(), 2);
    assert_eq!(manager.get_status(VaultId::B).unwrap().active_scars, 0);
}

// --- Sinks and bookkeeping ---

#[test]
fn entropy_sink_sees_insert_and_compression() {
    let sink = Arc::new(RecordingEntropySink::default());
    let mut config = quiet_config();
    config.optimization.compression_entropy_threshold = 0.5;
    let manager = VaultManager::new(config).unwrap().with_entropy_sink(sink.clone());

    manager.insert(to_a(0.1).with_expression(Expression::from_features([("x", 1.0)]))).unwrap();
    assert_eq!(*sink.changes.lock().unwrap(), vec![(VaultId::A, 0.0, 0.1)]);

    manager.insert(scar(0.8, -0.2).with_expression(Expression::from_features([("y", 1.0)]))).unwrap();
    manager.run_cycle().unwrap();

    let changes = sink.changes.lock().unwrap();
    let last = changes.last().unwrap();
    assert_eq!(last.0, VaultId::B);
    assert!((last.2 - 0.4).abs() < 1e-9);
}

#[test]
fn cycle_counter_advances() {
    let manager = VaultManager::new(VaultConfig::default()).unwrap();
    assert_eq!(manager.cycle().unwrap(), 0);
    let report = manager.run_cycle().unwrap();
    assert_eq!(report.cycle, 1);
    assert_eq!(manager.cycle().unwrap(), 1);
    assert_eq!(report.fracture_state(VaultId::B), Some(FractureState::Stable));
}
