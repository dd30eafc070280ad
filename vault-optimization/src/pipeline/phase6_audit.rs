//! Phase 6: Audit reporting.
//!
//! One record per removal, compaction, compression and retention marking,
//! plus a pass summary carrying before/after vault aggregates.

use vault_core::models::{AuditOperation, AuditRecord, VaultMetadata};
use vault_store::ReindexReport;

use super::compression::{describe, CompressionOutcome};
use super::phase1_pruning::PrunedScar;
use super::phase2_compaction::CompactionRecord;
use super::phase4_retention::RetentionMarks;
use super::PhaseContext;
use crate::scheduling::TriggerReason;

pub struct AuditInputs<'a> {
    pub triggers: &'a [TriggerReason],
    pub pruned: &'a [PrunedScar],
    pub compactions: &'a [CompactionRecord],
    pub reindex: Option<&'a ReindexReport>,
    pub retention: Option<&'a RetentionMarks>,
    pub compression: Option<&'a CompressionOutcome>,
    pub before: VaultMetadata,
    pub after: VaultMetadata,
}

pub fn build_records(ctx: &PhaseContext, inputs: &AuditInputs<'_>) -> Vec<AuditRecord> {
    let mut records = Vec::new();

    for pruned in inputs.pruned {
        records.push(
            AuditRecord::new(AuditOperation::Prune, ctx.vault_id, ctx.cycle)
                .with_ids(vec![pruned.scar_id.clone()], vec![])
                .with_details(serde_json::json!({ "reason": pruned.reason.as_str() })),
        );
    }

    for compaction in inputs.compactions {
        records.push(
            AuditRecord::new(AuditOperation::Compact, ctx.vault_id, ctx.cycle)
                .with_ids(compaction.source_ids.clone(), vec![compaction.latent_id.clone()])
                .with_details(serde_json::json!({
                    "avg_post_entropy": compaction.avg_post_entropy,
                })),
        );
    }

    if let Some(reindex) = inputs.reindex {
        records.push(
            AuditRecord::new(AuditOperation::Reindex, ctx.vault_id, ctx.cycle).with_details(
                serde_json::json!({
                    "entries": reindex.entries,
                    "active": reindex.active,
                    "generation": reindex.generation,
                }),
            ),
        );
    }

    if let Some(marks) = inputs.retention {
        if !marks.marked.is_empty() || !marks.cleared.is_empty() {
            records.push(
                AuditRecord::new(AuditOperation::RetentionMark, ctx.vault_id, ctx.cycle)
                    .with_ids(marks.cleared.clone(), marks.marked.clone())
                    .with_details(serde_json::json!({ "pass": ctx.pass_number })),
            );
        }
    }

    if let Some(outcome) = inputs.compression {
        records.push(
            AuditRecord::new(AuditOperation::Compress, ctx.vault_id, ctx.cycle)
                .with_ids(vec![outcome.scar_id.clone()], vec![outcome.scar_id.clone()])
                .with_aggregates(
                    VaultMetadata { entropy_sum: outcome.entropy_before, ..inputs.after.clone() },
                    inputs.after.clone(),
                )
                .with_details(describe(outcome, ctx.vault_id)),
        );
    }

    let triggers: Vec<&str> = inputs.triggers.iter().map(|t| t.as_str()).collect();
    records.push(
        AuditRecord::new(AuditOperation::PassSummary, ctx.vault_id, ctx.cycle)
            .with_aggregates(inputs.before.clone(), inputs.after.clone())
            .with_details(serde_json::json!({
                "pass": ctx.pass_number,
                "triggers": triggers,
                "pruned": inputs.pruned.len(),
                "compactions": inputs.compactions.len(),
                "compressed": inputs.compression.is_some(),
            })),
    );

    records
}

/// Record for a pass rolled back after a fatal error.
pub fn aborted_record(ctx: &PhaseContext, error: &str, aggregates: VaultMetadata) -> AuditRecord {
    AuditRecord::new(AuditOperation::PassAborted, ctx.vault_id, ctx.cycle)
        .with_aggregates(aggregates.clone(), aggregates)
        .with_details(serde_json::json!({ "pass": ctx.pass_number, "error": error }))
}
