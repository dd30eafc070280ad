//! Fallback backlog: scars redirected to the sibling while a vault was
//! isolated, migrated home at a throttled rate during recovery.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use vault_core::errors::VaultResult;
use vault_core::VaultId;
use vault_store::ScarStore;

#[derive(Debug, Clone, Default)]
pub struct FallbackBacklog {
    pending: VecDeque<String>,
}

impl FallbackBacklog {
    pub fn push(&mut self, scar_id: impl Into<String>) {
        self.pending.push_back(scar_id.into());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.pending.iter()
    }

    /// Move up to `limit` backlog scars from `sibling` into `home`.
    ///
    /// Entries no longer held by the sibling (pruned, compacted) are dropped.
    /// A full home vault stops the batch; the entry stays at the front.
    pub fn migrate(
        &mut self,
        home: &mut ScarStore,
        sibling: &mut ScarStore,
        limit: usize,
    ) -> VaultResult<MigrationReport> {
        let mut report = MigrationReport {
            from: sibling.vault_id(),
            to: home.vault_id(),
            migrated: vec![],
            dropped: vec![],
            remaining: 0,
        };

        while report.migrated.len() < limit {
            let Some(scar_id) = self.pending.pop_front() else {
                break;
            };
            let Some(scar) = sibling.remove(&scar_id) else {
                report.dropped.push(scar_id);
                continue;
            };
            if let Err(e) = home.insert(scar.clone()) {
                tracing::warn!(
                    scar_id = %scar_id,
                    home = %report.to,
                    error = %e,
                    "backlog migration stalled"
                );
                sibling.reinstate(scar)?;
                self.pending.push_front(scar_id);
                break;
            }
            report.migrated.push(scar_id);
        }

        report.remaining = self.pending.len();
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub from: VaultId,
    pub to: VaultId,
    pub migrated: Vec<String>,
    pub dropped: Vec<String>,
    pub remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::Scar;

    #[test]
    fn migrates_within_limit_and_stamps_home() {
        let mut home = ScarStore::new(VaultId::A, 100);
        let mut sibling = ScarStore::new(VaultId::B, 100);
        let mut backlog = FallbackBacklog::default();
        for _ in 0..5 {
            let scar = Scar::new(["g"], "r", 0.1, 0.1, 0.0, 0.0, VaultId::A);
            backlog.push(scar.scar_id.clone());
            sibling.insert(scar).unwrap();
        }

        let report = backlog.migrate(&mut home, &mut sibling, 3).unwrap();
        assert_eq!(report.migrated.len(), 3);
        assert_eq!(report.remaining, 2);
        assert_eq!(home.len(), 3);
        assert_eq!(sibling.len(), 2);
        for id in &report.migrated {
            let scar = home.get(id).unwrap();
            assert_eq!(scar.current_vault, VaultId::A);
            assert_eq!(scar.origin_vault, VaultId::A);
        }
    }

    #[test]
    fn vanished_entries_are_dropped() {
        let mut home = ScarStore::new(VaultId::A, 100);
        let mut sibling = ScarStore::new(VaultId::B, 100);
        let mut backlog = FallbackBacklog::default();
        backlog.push("gone");

        let report = backlog.migrate(&mut home, &mut sibling, 50).unwrap();
        assert_eq!(report.dropped, vec!["gone".to_string()]);
        assert!(backlog.is_empty());
    }

    #[test]
    fn full_home_stalls_without_losing_scars() {
        let mut home = ScarStore::new(VaultId::A, 0);
        let mut sibling = ScarStore::new(VaultId::B, 100);
        let mut backlog = FallbackBacklog::default();
        let scar = Scar::new(["g"], "r", 0.1, 0.1, 0.0, 0.0, VaultId::A);
        let id = scar.scar_id.clone();
        backlog.push(id.clone());
        sibling.insert(scar).unwrap();
        sibling.roll_cycle();
        let generation = sibling.generation();

        let report = backlog.migrate(&mut home, &mut sibling, 50).unwrap();
        assert!(report.migrated.is_empty());
        assert_eq!(report.remaining, 1);
        assert!(sibling.contains(&id));
        assert_eq!(sibling.total_scars(), 1);
        assert_eq!(sibling.incoming_load(), 0);
        assert_eq!(sibling.outgoing_load(), 0);
        assert_eq!(sibling.active_count(), 1);
        // remove + reinstate, no arrival
        assert_eq!(sibling.generation(), generation + 2);
    }
}
