//! Friction delay queue and ticket bookkeeping.

use std::collections::{HashMap, VecDeque};

use vault_core::config::defaults::DEFAULT_RESOLVED_TICKET_CAPACITY;
use vault_core::models::TicketStatus;
use vault_core::{Scar, VaultId};

use crate::routing::RouteRule;

/// An insert held back by friction or by both vaults being isolated.
#[derive(Debug, Clone)]
pub struct DelayedInsert {
    pub ticket: u64,
    pub scar: Scar,
    pub target: VaultId,
    pub rule: RouteRule,
    pub cycles_waited: u32,
}

/// Pending inserts plus the final status of recently resolved tickets.
///
/// At most `resolved_capacity` resolved tickets are remembered; older ones
/// report `Unknown`.
#[derive(Debug)]
pub struct DelayQueue {
    next_ticket: u64,
    pending: VecDeque<DelayedInsert>,
    resolved: HashMap<u64, TicketStatus>,
    resolved_order: VecDeque<u64>,
    resolved_capacity: usize,
}

impl Default for DelayQueue {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVED_TICKET_CAPACITY)
    }
}

impl DelayQueue {
    pub fn new(resolved_capacity: usize) -> Self {
        Self {
            next_ticket: 0,
            pending: VecDeque::new(),
            resolved: HashMap::new(),
            resolved_order: VecDeque::new(),
            resolved_capacity: resolved_capacity.max(1),
        }
    }

    /// Queue a scar and return its ticket.
    pub fn enqueue(&mut self, scar: Scar, target: VaultId, rule: RouteRule) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending.push_back(DelayedInsert { ticket, scar, target, rule, cycles_waited: 0 });
        ticket
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains_scar(&self, scar_id: &str) -> bool {
        self.pending.iter().any(|d| d.scar.scar_id == scar_id)
    }

    /// Take every pending entry for re-evaluation, in arrival order.
    pub fn drain(&mut self) -> Vec<DelayedInsert> {
        self.pending.drain(..).collect()
    }

    /// Put an entry back, keeping its place behind already re-queued ones.
    pub fn requeue(&mut self, entry: DelayedInsert) {
        self.pending.push_back(entry);
    }

    pub fn resolve(&mut self, ticket: u64, status: TicketStatus) {
        if self.resolved.insert(ticket, status).is_some() {
            return;
        }
        self.resolved_order.push_back(ticket);
        while self.resolved_order.len() > self.resolved_capacity {
            if let Some(oldest) = self.resolved_order.pop_front() {
                self.resolved.remove(&oldest);
            }
        }
    }

    /// Resolved tickets currently remembered.
    pub fn resolved_len(&self) -> usize {
        self.resolved.len()
    }

    pub fn status(&self, ticket: u64) -> TicketStatus {
        if let Some(entry) = self.pending.iter().find(|d| d.ticket == ticket) {
            return TicketStatus::Pending {
                target: entry.target,
                cycles_waited: entry.cycles_waited,
            };
        }
        self.resolved.get(&ticket).cloned().unwrap_or(TicketStatus::Unknown)
    }
}
