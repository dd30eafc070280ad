//! Structured log events for vault operations.
//!
//! Each function emits a `tracing` event with structured fields.

use vault_core::models::{AuditRecord, FractureState, QuarantineEvent};
use vault_core::VaultId;

pub fn scar_inserted(scar_id: &str, vault: VaultId, rule: &str) {
    tracing::info!(
        event = "scar_inserted",
        scar_id = %scar_id,
        vault = %vault,
        rule = %rule,
        "scar inserted"
    );
}

pub fn scar_delayed(scar_id: &str, target: VaultId, ticket: u64, friction: f64) {
    tracing::info!(
        event = "scar_delayed",
        scar_id = %scar_id,
        target = %target,
        ticket = ticket,
        friction = friction,
        "scar insertion delayed by friction"
    );
}

pub fn scar_forced_insert(scar_id: &str, vault: VaultId, cycles_waited: u32) {
    tracing::warn!(
        event = "scar_forced_insert",
        scar_id = %scar_id,
        vault = %vault,
        cycles_waited = cycles_waited,
        "delay cap reached, inserting despite friction"
    );
}

pub fn scar_redirected(scar_id: &str, from: VaultId, to: VaultId) {
    tracing::info!(
        event = "scar_redirected",
        scar_id = %scar_id,
        from = %from,
        to = %to,
        "target vault isolated, redirected to sibling"
    );
}

pub fn scar_rejected(scar_id: &str, reason: &str) {
    tracing::warn!(
        event = "scar_rejected",
        scar_id = %scar_id,
        reason = %reason,
        "scar rejected"
    );
}

pub fn scar_pruned(scar_id: &str, vault: VaultId, cycle: u64, reason: &str) {
    tracing::info!(
        event = "scar_pruned",
        scar_id = %scar_id,
        vault = %vault,
        cycle = cycle,
        reason = %reason,
        "scar pruned"
    );
}

pub fn scars_compacted(source_ids: &[String], latent_id: &str, vault: VaultId, cycle: u64) {
    tracing::info!(
        event = "scars_compacted",
        source_ids = ?source_ids,
        latent_id = %latent_id,
        vault = %vault,
        cycle = cycle,
        "cluster compacted into latent pattern"
    );
}

pub fn scar_compressed(scar_id: &str, vault: VaultId, entropy_before: f64, entropy_after: f64) {
    tracing::info!(
        event = "scar_compressed",
        scar_id = %scar_id,
        vault = %vault,
        entropy_before = entropy_before,
        entropy_after = entropy_after,
        "scar expression compressed"
    );
}

pub fn scar_quarantined(event: &QuarantineEvent) {
    tracing::warn!(
        event = "scar_quarantined",
        scar_id = %event.scar_id,
        vault = %event.vault_id,
        idi = event.idi,
        action = ?event.action,
        cycle = event.cycle,
        reason = %event.reason,
        "scar quarantined"
    );
}

pub fn fracture_transition(vault: VaultId, from: FractureState, to: FractureState, vsi: f64) {
    tracing::warn!(
        event = "fracture_transition",
        vault = %vault,
        from = ?from,
        to = ?to,
        vsi = vsi,
        "vault fracture state changed"
    );
}

pub fn backlog_migrated(from: VaultId, to: VaultId, migrated: usize, remaining: usize) {
    tracing::info!(
        event = "backlog_migrated",
        from = %from,
        to = %to,
        migrated = migrated,
        remaining = remaining,
        "fallback backlog migrated"
    );
}

pub fn maintenance_aborted(vault: VaultId, cycle: u64, error: &str) {
    tracing::error!(
        event = "maintenance_aborted",
        vault = %vault,
        cycle = cycle,
        error = %error,
        "maintenance pass aborted, store restored to checkpoint"
    );
}

/// Emit an audit record as a structured log entry.
pub fn audit_record(record: &AuditRecord) {
    tracing::info!(
        event = "audit_record",
        operation = record.operation.as_str(),
        vault = %record.vault_id,
        cycle = record.cycle,
        scar_ids_before = ?record.scar_ids_before,
        scar_ids_after = ?record.scar_ids_after,
        details = %record.details,
        "audit"
    );
}
