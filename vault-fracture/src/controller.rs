//! FractureController: per-vault stress state machine plus quarantine
//! screening and backlog recovery.

use std::sync::Arc;

use vault_core::config::FractureConfig;
use vault_core::errors::VaultResult;
use vault_core::models::{FractureTransition, QuarantineEvent};
use vault_core::traits::{IQuarantineSink, IStressProbe, StressSignals};
use vault_core::{FractureState, VaultId};
use vault_observability::tracing_setup::events;
use vault_store::ScarStore;

use crate::backlog::{FallbackBacklog, MigrationReport};
use crate::probe::CompositeStressProbe;
use crate::quarantine;

#[derive(Debug, Clone, Default)]
struct VaultFracture {
    state: FractureState,
    isolation_remaining: u32,
    last_vsi: f64,
    backlog: FallbackBacklog,
    transitions: Vec<FractureTransition>,
}

pub struct FractureController {
    config: FractureConfig,
    probe: Box<dyn IStressProbe>,
    sink: Option<Arc<dyn IQuarantineSink>>,
    vaults: [VaultFracture; 2],
}

impl FractureController {
    pub fn new(config: &FractureConfig) -> Self {
        Self {
            config: config.clone(),
            probe: Box::new(CompositeStressProbe),
            sink: None,
            vaults: Default::default(),
        }
    }

    /// Replace the default composite VSI probe.
    pub fn with_probe(mut self, probe: Box<dyn IStressProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_quarantine_sink(mut self, sink: Arc<dyn IQuarantineSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the probe after construction.
    pub fn set_probe(&mut self, probe: Box<dyn IStressProbe>) {
        self.probe = probe;
    }

    /// Set the quarantine sink after construction.
    pub fn set_quarantine_sink(&mut self, sink: Arc<dyn IQuarantineSink>) {
        self.sink = Some(sink);
    }

    pub fn config(&self) -> &FractureConfig {
        &self.config
    }

    pub fn state(&self, vault: VaultId) -> FractureState {
        self.vaults[vault.index()].state
    }

    pub fn accepts_inserts(&self, vault: VaultId) -> bool {
        self.state(vault).accepts_inserts()
    }

    pub fn last_vsi(&self, vault: VaultId) -> f64 {
        self.vaults[vault.index()].last_vsi
    }

    /// Cycles of isolation left for `vault`.
    pub fn isolation_remaining(&self, vault: VaultId) -> u32 {
        self.vaults[vault.index()].isolation_remaining
    }

    pub fn transitions(&self, vault: VaultId) -> &[FractureTransition] {
        &self.vaults[vault.index()].transitions
    }

    pub fn backlog_len(&self, vault: VaultId) -> usize {
        self.vaults[vault.index()].backlog.len()
    }

    /// Remember a scar that was redirected away from `home` during isolation.
    pub fn record_redirect(&mut self, home: VaultId, scar_id: impl Into<String>) {
        self.vaults[home.index()].backlog.push(scar_id);
    }

    /// Measure VSI through the probe and advance the state machine.
    pub fn check(&mut self, signals: &StressSignals) -> Vec<FractureTransition> {
        let vsi = self.probe.measure(signals);
        let vsi = if vsi.is_finite() { vsi.clamp(0.0, 1.0) } else { 0.0 };
        self.step(signals.vault_id, vsi, signals.cycle)
    }

    /// Advance the state machine for one cycle with an already measured VSI.
    pub fn step(&mut self, vault: VaultId, vsi: f64, cycle: u64) -> Vec<FractureTransition> {
        let fracture = self.config.vsi_fracture_threshold;
        let stress = self.config.vsi_stress_threshold;
        let isolation = self.config.isolation_cycles;

        let v = &mut self.vaults[vault.index()];
        v.last_vsi = vsi;

        let mut path = Vec::new();
        match v.state {
            FractureState::Stable | FractureState::Stressed | FractureState::Recovering
                if vsi > fracture =>
            {
                path.push(FractureState::Fractured);
                path.push(FractureState::Isolated);
                v.isolation_remaining = isolation;
            }
            FractureState::Stable if vsi > stress => path.push(FractureState::Stressed),
            FractureState::Stressed if vsi <= stress => path.push(FractureState::Stable),
            FractureState::Fractured => {
                path.push(FractureState::Isolated);
                v.isolation_remaining = isolation;
            }
            FractureState::Isolated => {
                v.isolation_remaining = v.isolation_remaining.saturating_sub(1);
                if v.isolation_remaining == 0 {
                    path.push(FractureState::Recovering);
                }
            }
            _ => {}
        }

        let mut transitions = Vec::with_capacity(path.len());
        for to in path {
            let transition = FractureTransition { vault_id: vault, from: v.state, to, cycle, vsi };
            events::fracture_transition(vault, transition.from, to, vsi);
            v.state = to;
            v.transitions.push(transition.clone());
            transitions.push(transition);
        }
        transitions
    }

    /// Migrate a throttled batch of `home`'s backlog back from `sibling`.
    ///
    /// Only runs while `home` is recovering. Returns the batch report and the
    /// `Recovering → Stable` transition once the backlog has drained.
    pub fn recover(
        &mut self,
        home: &mut ScarStore,
        sibling: &mut ScarStore,
        cycle: u64,
    ) -> VaultResult<(Option<MigrationReport>, Option<FractureTransition>)> {
        let vault = home.vault_id();
        let limit = self.config.fallback_throttle_rate;
        let v = &mut self.vaults[vault.index()];
        if v.state != FractureState::Recovering {
            return Ok((None, None));
        }

        let report = if v.backlog.is_empty() {
            None
        } else {
            let report = v.backlog.migrate(home, sibling, limit)?;
            events::backlog_migrated(report.from, report.to, report.migrated.len(), report.remaining);
            Some(report)
        };

        let transition = if v.backlog.is_empty() {
            let transition = FractureTransition {
                vault_id: vault,
                from: FractureState::Recovering,
                to: FractureState::Stable,
                cycle,
                vsi: v.last_vsi,
            };
            events::fracture_transition(vault, transition.from, transition.to, transition.vsi);
            v.state = FractureState::Stable;
            v.transitions.push(transition.clone());
            Some(transition)
        } else {
            None
        };

        Ok((report, transition))
    }

    fn notify(&self, events_out: &[QuarantineEvent]) {
        for event in events_out {
            events::scar_quarantined(event);
            if let Some(sink) = &self.sink {
                sink.on_quarantine(event);
            }
        }
    }

    /// Screen one freshly committed scar.
    pub fn screen_insert(
        &self,
        store: &mut ScarStore,
        scar_id: &str,
        cycle: u64,
    ) -> VaultResult<Option<QuarantineEvent>> {
        let event = quarantine::screen_stored(store, scar_id, &self.config, cycle)?;
        if let Some(event) = &event {
            self.notify(std::slice::from_ref(event));
        }
        Ok(event)
    }

    /// Screen every scar in `store`.
    pub fn sweep(&self, store: &mut ScarStore, cycle: u64) -> Vec<QuarantineEvent> {
        let swept = quarantine::sweep(store, &self.config, cycle);
        self.notify(&swept);
        swept
    }
}
