//! OptimizationEngine: evaluates triggers and runs the 6-phase pass against
//! one store, restoring a checkpoint when a phase hits a fatal error.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use vault_core::config::OptimizationConfig;
use vault_core::errors::{VaultError, VaultResult};
use vault_core::models::AuditRecord;
use vault_core::traits::{IScarArchive, IScarClusterer};
use vault_core::{VaultConfig, VaultId};
use vault_observability::tracing_setup::events;
use vault_retention::RetentionScorer;
use vault_store::{ReindexReport, ScarStore};

use crate::clustering::HdbscanClusterer;
use crate::history::VaultHistory;
use crate::pipeline::compression::{compress_one, CompressionOutcome};
use crate::pipeline::phase1_pruning::{self, PrunedScar};
use crate::pipeline::phase2_compaction::{self, CompactionRecord};
use crate::pipeline::phase4_retention::{self, RetentionMarks};
use crate::pipeline::phase6_audit::{self, AuditInputs};
use crate::pipeline::{phase3_reindex, phase5_compression, PhaseContext};
use crate::scheduling::{collect_signals, evaluate_triggers, TriggerReason};

/// Outcome of one maintenance cycle for one vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    pub vault_id: VaultId,
    pub cycle: u64,
    pub triggers: Vec<TriggerReason>,
    /// Pass number when the triggered phases ran.
    pub pass_number: Option<u64>,
    pub pruned: Vec<PrunedScar>,
    pub compactions: Vec<CompactionRecord>,
    pub reindex: Option<ReindexReport>,
    pub low_priority: RetentionMarks,
    pub compression: Option<CompressionOutcome>,
    pub audit: Vec<AuditRecord>,
    /// Error that forced a rollback, if any.
    pub aborted: Option<String>,
}

impl PassReport {
    fn empty(vault_id: VaultId, cycle: u64, triggers: Vec<TriggerReason>) -> Self {
        Self {
            vault_id,
            cycle,
            triggers,
            pass_number: None,
            pruned: vec![],
            compactions: vec![],
            reindex: None,
            low_priority: RetentionMarks::default(),
            compression: None,
            audit: vec![],
            aborted: None,
        }
    }

    /// Whether the cycle changed the store.
    pub fn did_work(&self) -> bool {
        !self.pruned.is_empty() || !self.compactions.is_empty() || self.compression.is_some()
    }
}

/// Run `f` against `store`, restoring the pre-call state if it fails.
pub(crate) fn with_checkpoint<T, F>(store: &mut ScarStore, f: F) -> VaultResult<T>
where
    F: FnOnce(&mut ScarStore) -> VaultResult<T>,
{
    let checkpoint = store.clone();
    match f(store) {
        Ok(value) => Ok(value),
        Err(e) => {
            *store = checkpoint;
            Err(e)
        }
    }
}

/// The optimization engine.
///
/// Stateless across vaults apart from the shared tie-break rng, so one engine
/// can maintain both vaults in parallel.
pub struct OptimizationEngine {
    config: OptimizationConfig,
    scorer: RetentionScorer,
    grace_passes: u32,
    symbolic_capacity: usize,
    clusterer: Box<dyn IScarClusterer>,
    archive: Option<Arc<dyn IScarArchive>>,
    rng: Mutex<StdRng>,
}

impl OptimizationEngine {
    pub fn new(config: &VaultConfig) -> Self {
        let rng = match config.optimization.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config: config.optimization.clone(),
            scorer: RetentionScorer::from_config(&config.retention),
            grace_passes: config.retention.grace_passes,
            symbolic_capacity: config.capacity.symbolic_capacity,
            clusterer: Box::new(HdbscanClusterer::new()),
            archive: None,
            rng: Mutex::new(rng),
        }
    }

    /// Replace the default HDBSCAN clusterer.
    pub fn with_clusterer(mut self, clusterer: Box<dyn IScarClusterer>) -> Self {
        self.clusterer = clusterer;
        self
    }

    /// Archive pruned and compacted scars before deletion.
    pub fn with_archive(mut self, archive: Arc<dyn IScarArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    pub fn scorer(&self) -> &RetentionScorer {
        &self.scorer
    }

    pub fn grace_passes(&self) -> u32 {
        self.grace_passes
    }

    pub fn clusterer_name(&self) -> &str {
        self.clusterer.name()
    }

    /// Triggers currently firing for `store`.
    pub fn evaluate(&self, store: &ScarStore, history: &VaultHistory) -> Vec<TriggerReason> {
        let signals = collect_signals(store, history, &self.config, self.symbolic_capacity);
        evaluate_triggers(&signals, &self.config)
    }

    /// Run end-of-cycle maintenance with the configured grace period.
    pub fn run_cycle(&self, store: &mut ScarStore, history: &mut VaultHistory, cycle: u64) -> PassReport {
        self.run_cycle_with_grace(store, history, cycle, self.grace_passes)
    }

    /// Run end-of-cycle maintenance.
    ///
    /// Triggered phases (prune, compact, reindex, retention) run only when a
    /// trigger fires; compression runs whenever the entropy threshold is
    /// exceeded. On a fatal error the store is restored to its pre-pass state.
    pub fn run_cycle_with_grace(
        &self,
        store: &mut ScarStore,
        history: &mut VaultHistory,
        cycle: u64,
        grace_passes: u32,
    ) -> PassReport {
        let vault_id = store.vault_id();
        let triggers = self.evaluate(store, history);
        let compress = phase5_compression::should_compress(store, &self.config);

        let mut report = PassReport::empty(vault_id, cycle, triggers);
        if report.triggers.is_empty() && !compress {
            return report;
        }

        let pass_number = if report.triggers.is_empty() {
            0
        } else {
            history.begin_pass()
        };
        let ctx = PhaseContext { vault_id, cycle, pass_number, grace_passes };

        let before = store.metadata();

        match with_checkpoint(store, |s| self.run_phases(s, &ctx, &mut report)) {
            Ok(()) => {
                let after = store.metadata();
                report.audit = phase6_audit::build_records(
                    &ctx,
                    &AuditInputs {
                        triggers: &report.triggers,
                        pruned: &report.pruned,
                        compactions: &report.compactions,
                        reindex: report.reindex.as_ref(),
                        retention: report.pass_number.map(|_| &report.low_priority),
                        compression: report.compression.as_ref(),
                        before,
                        after,
                    },
                );
            }
            Err(e) => {
                let message = e.to_string();
                if !e.is_fatal_to_pass() {
                    tracing::warn!(vault = %vault_id, cycle, error = %message, "non-index error aborted pass");
                }
                events::maintenance_aborted(vault_id, cycle, &message);

                let mut aborted = PassReport::empty(vault_id, cycle, std::mem::take(&mut report.triggers));
                aborted.pass_number = report.pass_number;
                aborted.audit = vec![phase6_audit::aborted_record(&ctx, &message, before)];
                aborted.aborted = Some(message);
                return aborted;
            }
        }

        report
    }

    fn run_phases(&self, store: &mut ScarStore, ctx: &PhaseContext, report: &mut PassReport) -> VaultResult<()> {
        if !report.triggers.is_empty() {
            report.pass_number = Some(ctx.pass_number);
            let active_before = store.active_count();

            // Phase 1: Drift collapse pruning.
            report.pruned =
                phase1_pruning::run(store, ctx, &self.config, &self.scorer, self.archive.as_ref())?;

            // Phase 2: Composite compaction.
            report.compactions = phase2_compaction::run(
                store,
                ctx,
                &self.config,
                self.clusterer.as_ref(),
                self.archive.as_ref(),
            )?;

            // Phase 3: Reindex, verified against the expected active count.
            let compacted: usize = report.compactions.iter().map(|c| c.source_ids.len()).sum();
            let expected = phase3_reindex::expected_active(
                active_before,
                report.pruned.len(),
                compacted,
                report.compactions.len(),
            );
            report.reindex = Some(phase3_reindex::run(store, expected)?);

            // Phase 4: Retention scoring.
            report.low_priority = phase4_retention::run(store, ctx, &self.scorer)?;
        }

        // Phase 5: Memory compression.
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| VaultError::poisoned("optimization rng"))?;
        report.compression = phase5_compression::run(store, &self.config, &self.scorer, &mut *rng)?;

        Ok(())
    }

    /// Compress one scar unconditionally.
    pub fn compress_now(&self, store: &mut ScarStore) -> VaultResult<Option<CompressionOutcome>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| VaultError::poisoned("optimization rng"))?;
        compress_one(store, &self.scorer, &mut *rng, self.config.compression_keep_features)
    }
}
