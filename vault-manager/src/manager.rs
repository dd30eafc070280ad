//! VaultManager: owns vaults A and B and drives them on the cycle clock.
//!
//! Lock order is always cycle state, then A, then B. Status reads take a
//! single store read lock and never wait on the cycle state.
//!
//! An insert holds the cycle state and both store write locks from the
//! duplicate check to the commit: routing reads both entropy sums, and the
//! entropy-balance rule needs them unchanged until the scar lands. Inserts
//! are therefore serialized across both vaults. `run_cycle` keeps both
//! store write locks through maintenance (clustering included), so a status
//! read issued mid-cycle waits until the cycle finishes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vault_core::errors::{ConfigError, IndexError, VaultError, VaultResult};
use vault_core::models::{
    AuditOperation, AuditRecord, FractureTransition, QuarantineAction, QuarantineEvent, RejectReason,
    TicketStatus,
};
use vault_core::scar::validate;
use vault_core::traits::{IEntropySink, IQuarantineSink, IScarArchive, IScarClusterer, IStressProbe, StressSignals};
use vault_core::{FractureState, InsertOutcome, Scar, VaultConfig, VaultId, VaultMetadata};
use vault_fracture::FractureController;
use vault_observability::tracing_setup::events;
use vault_observability::{cycle_span, maintenance_span, routing_span, AuditTrail, MetricsCollector};
use vault_optimization::{OptimizationEngine, PassReport, VaultHistory};
use vault_store::{friction, ScarStore};

use crate::delay::DelayQueue;
use crate::report::CycleReport;
use crate::routing::{priority_interrupt, route, RouteRule};
use crate::variants::{IVaultVariant, VariantContext};

/// Everything advanced by the cycle clock.
struct CycleState {
    cycle: u64,
    delay: DelayQueue,
    histories: [VaultHistory; 2],
    fracture: FractureController,
    variants: [Vec<Box<dyn IVaultVariant>>; 2],
    audit: AuditTrail,
    metrics: MetricsCollector,
}

/// The dual-vault manager.
pub struct VaultManager {
    config: VaultConfig,
    stores: [RwLock<ScarStore>; 2],
    engine: OptimizationEngine,
    state: Mutex<CycleState>,
    entropy_sink: Option<Arc<dyn IEntropySink>>,
}

fn pick<'a>(a: &'a ScarStore, b: &'a ScarStore, vault: VaultId) -> &'a ScarStore {
    match vault {
        VaultId::A => a,
        VaultId::B => b,
    }
}

fn pick_mut<'a>(a: &'a mut ScarStore, b: &'a mut ScarStore, vault: VaultId) -> &'a mut ScarStore {
    match vault {
        VaultId::A => a,
        VaultId::B => b,
    }
}

/// `(vault, sibling)` as mutable references.
fn split<'a>(a: &'a mut ScarStore, b: &'a mut ScarStore, vault: VaultId) -> (&'a mut ScarStore, &'a mut ScarStore) {
    match vault {
        VaultId::A => (a, b),
        VaultId::B => (b, a),
    }
}

fn close_cycle(store: &mut ScarStore, history: &mut VaultHistory, config: &VaultConfig, cycle: u64) {
    store.roll_cycle();
    friction::update(store, &config.friction, config.optimization.compression_entropy_threshold);
    history.record_cycle(cycle, store.entropy_sum(), store.incoming_load_last_cycle());
}

fn quarantine_record(event: &QuarantineEvent) -> AuditRecord {
    let after = match event.action {
        QuarantineAction::Review => vec![event.scar_id.clone()],
        QuarantineAction::Quarantine | QuarantineAction::Suspend => vec![],
    };
    AuditRecord::new(AuditOperation::Quarantine, event.vault_id, event.cycle)
        .with_ids(vec![event.scar_id.clone()], after)
        .with_details(serde_json::json!({
            "action": event.action,
            "idi": event.idi,
            "reason": event.reason,
        }))
}

impl VaultManager {
    /// Create a manager with two empty vaults.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        let capacity = config.capacity.max_active_per_shard;
        Self::from_stores(
            config,
            ScarStore::new(VaultId::A, capacity),
            ScarStore::new(VaultId::B, capacity),
        )
    }

    /// Create a manager around existing stores (e.g. loaded from storage).
    pub fn from_stores(config: VaultConfig, a: ScarStore, b: ScarStore) -> VaultResult<Self> {
        config.validate()?;
        if a.vault_id() != VaultId::A || b.vault_id() != VaultId::B {
            return Err(ConfigError::InvalidValue {
                key: "stores".to_string(),
                reason: format!("expected stores for A and B, got {} and {}", a.vault_id(), b.vault_id()),
            }
            .into());
        }

        let histories = [
            VaultHistory::new(
                config.optimization.entropy_history_window,
                config.optimization.density_window_cycles,
            ),
            VaultHistory::new(
                config.optimization.entropy_history_window,
                config.optimization.density_window_cycles,
            ),
        ];
        let state = CycleState {
            cycle: 0,
            delay: DelayQueue::new(config.friction.resolved_ticket_capacity),
            histories,
            fracture: FractureController::new(&config.fracture),
            variants: [Vec::new(), Vec::new()],
            audit: AuditTrail::new(config.observability.audit_trail_capacity),
            metrics: MetricsCollector::new(),
        };

        Ok(Self {
            engine: OptimizationEngine::new(&config),
            stores: [RwLock::new(a), RwLock::new(b)],
            state: Mutex::new(state),
            entropy_sink: None,
            config,
        })
    }

    fn state_mut(&mut self) -> &mut CycleState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the default HDBSCAN clusterer used by compaction.
    pub fn with_clusterer(mut self, clusterer: Box<dyn IScarClusterer>) -> Self {
        self.engine = self.engine.with_clusterer(clusterer);
        self
    }

    /// Archive pruned and compacted scars before deletion.
    pub fn with_archive(mut self, archive: Arc<dyn IScarArchive>) -> Self {
        self.engine = self.engine.with_archive(archive);
        self
    }

    /// Replace the default composite VSI probe.
    pub fn with_stress_probe(mut self, probe: Box<dyn IStressProbe>) -> Self {
        self.state_mut().fracture.set_probe(probe);
        self
    }

    pub fn with_quarantine_sink(mut self, sink: Arc<dyn IQuarantineSink>) -> Self {
        self.state_mut().fracture.set_quarantine_sink(sink);
        self
    }

    pub fn with_entropy_sink(mut self, sink: Arc<dyn IEntropySink>) -> Self {
        self.entropy_sink = Some(sink);
        self
    }

    /// Register a per-cycle variant for `vault`. Variants run in registration order.
    pub fn with_variant(mut self, vault: VaultId, variant: Box<dyn IVaultVariant>) -> Self {
        tracing::info!(vault = %vault, variant = variant.kind().as_str(), "vault variant registered");
        self.state_mut().variants[vault.index()].push(variant);
        self
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    fn lock_state(&self) -> VaultResult<MutexGuard<'_, CycleState>> {
        self.state.lock().map_err(|_| VaultError::poisoned("cycle state"))
    }

    fn read_store(&self, vault: VaultId) -> VaultResult<RwLockReadGuard<'_, ScarStore>> {
        self.stores[vault.index()]
            .read()
            .map_err(|_| VaultError::poisoned(format!("vault {vault}")))
    }

    fn write_stores(&self) -> VaultResult<(RwLockWriteGuard<'_, ScarStore>, RwLockWriteGuard<'_, ScarStore>)> {
        let a = self.stores[0]
            .write()
            .map_err(|_| VaultError::poisoned("vault A"))?;
        let b = self.stores[1]
            .write()
            .map_err(|_| VaultError::poisoned("vault B"))?;
        Ok((a, b))
    }

    // --- Insert path ---

    /// Route and commit a scar, or delay it under friction.
    ///
    /// Validation, capacity and duplicate-id failures come back as
    /// `InsertOutcome::Rejected`. `Err` is reserved for lock poisoning and
    /// store corruption.
    pub fn insert(&self, scar: Scar) -> VaultResult<InsertOutcome> {
        let _span = routing_span!(scar.scar_id).entered();
        let mut guard = self.lock_state()?;
        let state = &mut *guard;

        if let Err(e) = validate(&scar) {
            let reason = RejectReason::Validation(e);
            self.record_rejection(state, &scar.scar_id, scar.origin_vault, &reason);
            return Ok(InsertOutcome::Rejected { reason });
        }

        let (mut ga, mut gb) = self.write_stores()?;
        let (a, b) = (&mut *ga, &mut *gb);

        if a.contains(&scar.scar_id) || b.contains(&scar.scar_id) || state.delay.contains_scar(&scar.scar_id) {
            let reason = RejectReason::Duplicate { scar_id: scar.scar_id.clone() };
            self.record_rejection(state, &scar.scar_id, scar.origin_vault, &reason);
            return Ok(InsertOutcome::Rejected { reason });
        }

        let decision = route(&scar, a.entropy_sum(), b.entropy_sum(), &self.config.routing);

        let Some((vault, redirected)) = Self::placement(&state.fracture, decision.target) else {
            return Ok(self.delay(state, pick(a, b, decision.target), scar, decision.target, decision.rule));
        };

        if self.config.friction.scar_delay_cycles > 0 && self.friction_blocks(pick(a, b, vault), &scar) {
            return Ok(self.delay(state, pick(a, b, vault), scar, decision.target, decision.rule));
        }

        match self.commit(state, a, b, scar, decision.target, vault, redirected, decision.rule)? {
            Ok(scar_id) => Ok(InsertOutcome::Accepted { scar_id, vault, redirected }),
            Err(reason) => Ok(InsertOutcome::Rejected { reason }),
        }
    }

    /// Vault a scar headed for `target` can land in right now.
    fn placement(fracture: &FractureController, target: VaultId) -> Option<(VaultId, bool)> {
        if fracture.accepts_inserts(target) {
            Some((target, false))
        } else if fracture.accepts_inserts(target.sibling()) {
            Some((target.sibling(), true))
        } else {
            None
        }
    }

    fn friction_blocks(&self, store: &ScarStore, scar: &Scar) -> bool {
        store.friction_metric() > self.config.friction.mfg_threshold
            && !priority_interrupt(scar, store.active_count(), store.avg_cls_angle(), &self.config.routing)
    }

    fn delay(
        &self,
        state: &mut CycleState,
        store: &ScarStore,
        scar: Scar,
        target: VaultId,
        rule: RouteRule,
    ) -> InsertOutcome {
        let scar_id = scar.scar_id.clone();
        let ticket = state.delay.enqueue(scar, target, rule);
        events::scar_delayed(&scar_id, target, ticket, store.friction_metric());
        state.metrics.vault_mut(target).delayed += 1;
        InsertOutcome::Delayed { ticket, target }
    }

    fn record_rejection(&self, state: &mut CycleState, scar_id: &str, vault: VaultId, reason: &RejectReason) {
        events::scar_rejected(scar_id, &reason.to_string());
        state.metrics.vault_mut(vault).rejected += 1;
    }

    /// Store `scar` in `vault`. The outer `Result` carries fatal errors, the
    /// inner one a rejection.
    #[allow(clippy::too_many_arguments)]
    fn commit(
        &self,
        state: &mut CycleState,
        a: &mut ScarStore,
        b: &mut ScarStore,
        scar: Scar,
        home: VaultId,
        vault: VaultId,
        redirected: bool,
        rule: RouteRule,
    ) -> VaultResult<Result<String, RejectReason>> {
        let scar_id = scar.scar_id.clone();
        let store = pick_mut(a, b, vault);
        let before = store.entropy_sum();

        let rejection = match store.insert(scar) {
            Ok(()) => None,
            Err(VaultError::Capacity(e)) => Some(RejectReason::Capacity(e)),
            Err(VaultError::Index(IndexError::DuplicateScarId { scar_id })) => {
                Some(RejectReason::Duplicate { scar_id })
            }
            Err(e) => return Err(e),
        };
        if let Some(reason) = rejection {
            self.record_rejection(state, &scar_id, vault, &reason);
            return Ok(Err(reason));
        }

        if redirected {
            state.fracture.record_redirect(home, scar_id.clone());
            events::scar_redirected(&scar_id, home, vault);
            state.metrics.vault_mut(vault).redirected += 1;
        }
        events::scar_inserted(&scar_id, vault, rule.as_str());
        state.metrics.vault_mut(vault).inserted += 1;

        if let Some(event) = state.fracture.screen_insert(store, &scar_id, state.cycle)? {
            if event.action != QuarantineAction::Review {
                state.metrics.vault_mut(vault).quarantined += 1;
            }
            state.audit.record(quarantine_record(&event));
        }

        self.notify_entropy(vault, before, store.entropy_sum(), state.cycle);
        Ok(Ok(scar_id))
    }

    fn notify_entropy(&self, vault: VaultId, before: f64, after: f64, cycle: u64) {
        if let Some(sink) = &self.entropy_sink {
            if (after - before).abs() > f64::EPSILON {
                sink.entropy_changed(vault, before, after, cycle);
            }
        }
    }

    // --- Cycle driver ---

    /// Advance the cycle clock by one tick.
    ///
    /// Order: delayed inserts, load roll-over and friction, quarantine sweep,
    /// fracture check, backlog recovery, optimization (A and B in parallel),
    /// variants, entropy notifications.
    pub fn run_cycle(&self) -> VaultResult<CycleReport> {
        let mut guard = self.lock_state()?;
        let state = &mut *guard;
        state.cycle += 1;
        let cycle = state.cycle;
        let _span = cycle_span!(cycle).entered();

        let mut report = CycleReport::new(cycle);
        let (mut ga, mut gb) = self.write_stores()?;
        let (a, b) = (&mut *ga, &mut *gb);
        let entropy_start = [a.entropy_sum(), b.entropy_sum()];

        // 1. Delayed inserts.
        self.process_delayed(state, a, b, &mut report)?;

        // 2. Close the cycle's load counters, update friction and history.
        {
            let [ha, hb] = &mut state.histories;
            close_cycle(a, ha, &self.config, cycle);
            close_cycle(b, hb, &self.config, cycle);
        }

        // 3. Quarantine sweep.
        for store in [&mut *a, &mut *b] {
            let vault = store.vault_id();
            for event in state.fracture.sweep(store, cycle) {
                if event.action != QuarantineAction::Review {
                    state.metrics.vault_mut(vault).quarantined += 1;
                }
                state.audit.record(quarantine_record(&event));
                report.quarantined.push(event);
            }
        }

        // 4. Fracture check.
        for vault in VaultId::ALL {
            let store = pick(a, b, vault);
            let signals = StressSignals {
                vault_id: vault,
                cycle,
                friction: store.friction_metric(),
                entropy_slope: state.histories[vault.index()].entropy_slope(),
                thread_overlap: store.thread_overlap(),
                active_scars: store.active_count(),
            };
            report.transitions.extend(state.fracture.check(&signals));
        }

        // 5. Throttled backlog recovery.
        for vault in VaultId::ALL {
            let (home, sibling) = split(a, b, vault);
            let (migration, transition) = state.fracture.recover(home, sibling, cycle)?;
            if let Some(migration) = migration {
                state.metrics.vault_mut(vault).migrated += migration.migrated.len() as u64;
                if !migration.migrated.is_empty() || !migration.dropped.is_empty() {
                    state.audit.record(
                        AuditRecord::new(AuditOperation::Migrate, vault, cycle)
                            .with_ids(migration.migrated.clone(), migration.migrated.clone())
                            .with_details(serde_json::json!({
                                "from": migration.from,
                                "dropped": migration.dropped,
                                "remaining": migration.remaining,
                            })),
                    );
                }
                report.migrations.push(migration);
            }
            report.transitions.extend(transition);
        }

        // 6. Optimization, both vaults in parallel.
        let grace = |vault: VaultId, state: &CycleState| {
            state.variants[vault.index()]
                .iter()
                .filter_map(|v| v.pruning_grace_passes())
                .max()
                .unwrap_or(self.engine.grace_passes())
        };
        let (grace_a, grace_b) = (grace(VaultId::A, &*state), grace(VaultId::B, &*state));
        let (pass_a, pass_b) = {
            let [ha, hb] = &mut state.histories;
            let engine = &self.engine;
            rayon::join(
                || {
                    let _span = maintenance_span!(VaultId::A, cycle).entered();
                    engine.run_cycle_with_grace(a, ha, cycle, grace_a)
                },
                || {
                    let _span = maintenance_span!(VaultId::B, cycle).entered();
                    engine.run_cycle_with_grace(b, hb, cycle, grace_b)
                },
            )
        };
        for pass in [pass_a, pass_b] {
            Self::record_pass(state, &pass);
            report.passes.push(pass);
        }

        // 7. Variants.
        for vault in VaultId::ALL {
            let store = pick_mut(a, b, vault);
            let ctx = VariantContext { vault_id: vault, cycle, config: &self.config, engine: &self.engine };
            for variant in state.variants[vault.index()].iter_mut() {
                match variant.on_cycle(store, &ctx) {
                    Ok(variant_report) => {
                        if variant_report.compression.is_some() {
                            state.metrics.vault_mut(vault).compressed += 1;
                        }
                        state.audit.extend(variant_report.audit.iter().cloned());
                        report.variants.push(variant_report);
                    }
                    Err(e) => {
                        tracing::warn!(
                            vault = %vault,
                            variant = variant.kind().as_str(),
                            error = %e,
                            "variant cycle failed"
                        );
                    }
                }
            }
        }

        // 8. Entropy notifications.
        for vault in VaultId::ALL {
            let after = pick(a, b, vault).entropy_sum();
            self.notify_entropy(vault, entropy_start[vault.index()], after, cycle);
        }

        report.fracture_states = VaultId::ALL.iter().map(|v| (*v, state.fracture.state(*v))).collect();
        Ok(report)
    }

    fn process_delayed(
        &self,
        state: &mut CycleState,
        a: &mut ScarStore,
        b: &mut ScarStore,
        report: &mut CycleReport,
    ) -> VaultResult<()> {
        let delay_cycles = self.config.friction.scar_delay_cycles;

        for mut entry in state.delay.drain() {
            entry.cycles_waited += 1;

            let Some((vault, redirected)) = Self::placement(&state.fracture, entry.target) else {
                state.delay.requeue(entry);
                continue;
            };

            let blocked = self.friction_blocks(pick(a, b, vault), &entry.scar);
            if blocked && entry.cycles_waited < delay_cycles {
                state.delay.requeue(entry);
                continue;
            }

            let ticket = entry.ticket;
            let waited = entry.cycles_waited;
            let status = match self.commit(state, a, b, entry.scar, entry.target, vault, redirected, entry.rule)? {
                Ok(scar_id) => {
                    if blocked {
                        events::scar_forced_insert(&scar_id, vault, waited);
                        state.metrics.vault_mut(vault).forced += 1;
                        state.audit.record(
                            AuditRecord::new(AuditOperation::ForcedInsert, vault, state.cycle)
                                .with_ids(vec![], vec![scar_id.clone()])
                                .with_details(serde_json::json!({
                                    "ticket": ticket,
                                    "cycles_waited": waited,
                                })),
                        );
                    }
                    TicketStatus::Accepted { scar_id, vault }
                }
                Err(reason) => TicketStatus::Rejected { reason: reason.to_string() },
            };

            state.delay.resolve(ticket, status.clone());
            report.committed.push((ticket, status));
        }
        Ok(())
    }

    fn record_pass(state: &mut CycleState, pass: &PassReport) {
        let metrics = state.metrics.vault_mut(pass.vault_id);
        metrics.pruned += pass.pruned.len() as u64;
        metrics.compacted += pass.compactions.len() as u64;
        if pass.compression.is_some() {
            metrics.compressed += 1;
        }
        if pass.pass_number.is_some() {
            metrics.maintenance_passes += 1;
        }
        if pass.aborted.is_some() {
            metrics.aborted_passes += 1;
        }
        state.audit.extend(pass.audit.iter().cloned());
    }

    // --- Read side ---

    /// Read-only aggregate snapshot.
    pub fn get_status(&self, vault: VaultId) -> VaultResult<VaultMetadata> {
        Ok(self.read_store(vault)?.metadata())
    }

    /// Run `f` against a read-locked store.
    pub fn with_store<R>(&self, vault: VaultId, f: impl FnOnce(&ScarStore) -> R) -> VaultResult<R> {
        let store = self.read_store(vault)?;
        Ok(f(&store))
    }

    /// Vault currently holding `scar_id`, if any.
    pub fn scar_location(&self, scar_id: &str) -> VaultResult<Option<VaultId>> {
        let a = self.read_store(VaultId::A)?;
        let b = self.read_store(VaultId::B)?;
        Ok(if a.contains(scar_id) {
            Some(VaultId::A)
        } else if b.contains(scar_id) {
            Some(VaultId::B)
        } else {
            None
        })
    }

    pub fn ticket_status(&self, ticket: u64) -> VaultResult<TicketStatus> {
        Ok(self.lock_state()?.delay.status(ticket))
    }

    /// Inserts waiting in the delay queue.
    pub fn pending_inserts(&self) -> VaultResult<usize> {
        Ok(self.lock_state()?.delay.len())
    }

    pub fn fracture_state(&self, vault: VaultId) -> VaultResult<FractureState> {
        Ok(self.lock_state()?.fracture.state(vault))
    }

    pub fn transitions(&self, vault: VaultId) -> VaultResult<Vec<FractureTransition>> {
        Ok(self.lock_state()?.fracture.transitions(vault).to_vec())
    }

    /// Redirected scars still waiting to migrate home to `vault`.
    pub fn backlog_len(&self, vault: VaultId) -> VaultResult<usize> {
        Ok(self.lock_state()?.fracture.backlog_len(vault))
    }

    /// Cycles run so far.
    pub fn cycle(&self) -> VaultResult<u64> {
        Ok(self.lock_state()?.cycle)
    }

    /// Snapshot of the audit trail.
    pub fn audit_trail(&self) -> VaultResult<AuditTrail> {
        Ok(self.lock_state()?.audit.clone())
    }

    pub fn metrics(&self) -> VaultResult<MetricsCollector> {
        Ok(self.lock_state()?.metrics.clone())
    }

    /// Inject a measured friction value for `vault`.
    pub fn set_friction(&self, vault: VaultId, value: f64) -> VaultResult<()> {
        let _state = self.lock_state()?;
        let mut store = self.stores[vault.index()]
            .write()
            .map_err(|_| VaultError::poisoned(format!("vault {vault}")))?;
        store.set_friction_metric(value);
        Ok(())
    }
}
