use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VaultMetadata;
use crate::scar::VaultId;

/// Operations tracked in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    Prune,
    Compact,
    Reindex,
    RetentionMark,
    Compress,
    ForcedInsert,
    Quarantine,
    Migrate,
    Mutate,
    Synthesize,
    PassAborted,
    PassSummary,
}

impl AuditOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditOperation::Prune => "prune",
            AuditOperation::Compact => "compact",
            AuditOperation::Reindex => "reindex",
            AuditOperation::RetentionMark => "retention_mark",
            AuditOperation::Compress => "compress",
            AuditOperation::ForcedInsert => "forced_insert",
            AuditOperation::Quarantine => "quarantine",
            AuditOperation::Migrate => "migrate",
            AuditOperation::Mutate => "mutate",
            AuditOperation::Synthesize => "synthesize",
            AuditOperation::PassAborted => "pass_aborted",
            AuditOperation::PassSummary => "pass_summary",
        }
    }
}

/// A structured audit entry: what changed, in which vault, at which cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub operation: AuditOperation,
    pub vault_id: VaultId,
    pub cycle: u64,
    pub scar_ids_before: Vec<String>,
    pub scar_ids_after: Vec<String>,
    pub aggregates_before: Option<VaultMetadata>,
    pub aggregates_after: Option<VaultMetadata>,
    /// JSON details about the operation.
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(operation: AuditOperation, vault_id: VaultId, cycle: u64) -> Self {
        Self {
            operation,
            vault_id,
            cycle,
            scar_ids_before: Vec::new(),
            scar_ids_after: Vec::new(),
            aggregates_before: None,
            aggregates_after: None,
            details: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn with_ids(mut self, before: Vec<String>, after: Vec<String>) -> Self {
        self.scar_ids_before = before;
        self.scar_ids_after = after;
        self
    }

    pub fn with_aggregates(mut self, before: VaultMetadata, after: VaultMetadata) -> Self {
        self.aggregates_before = Some(before);
        self.aggregates_after = Some(after);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
