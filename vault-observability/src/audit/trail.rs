use std::collections::VecDeque;

use vault_core::models::{AuditOperation, AuditRecord};
use vault_core::VaultId;

use crate::tracing_setup::events;

/// Keeps the most recent audit records; every record is also logged.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    capacity: usize,
    records: VecDeque<AuditRecord>,
    total_recorded: u64,
}

impl AuditTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
            total_recorded: 0,
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn record(&mut self, record: AuditRecord) {
        events::audit_record(&record);
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.total_recorded += 1;
    }

    pub fn extend<I: IntoIterator<Item = AuditRecord>>(&mut self, records: I) {
        for record in records {
            self.record(record);
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter()
    }

    pub fn for_vault(&self, vault: VaultId) -> Vec<&AuditRecord> {
        self.records.iter().filter(|r| r.vault_id == vault).collect()
    }

    pub fn by_operation(&self, operation: AuditOperation) -> Vec<&AuditRecord> {
        self.records
            .iter()
            .filter(|r| r.operation == operation)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ever appended, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(vault_core::config::defaults::DEFAULT_AUDIT_TRAIL_CAPACITY)
    }
}
