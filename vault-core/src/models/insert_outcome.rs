use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CapacityError, ValidationError};
use crate::scar::VaultId;

/// Why an insert was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Capacity(#[from] CapacityError),

    #[error("scar {scar_id} already stored")]
    Duplicate { scar_id: String },
}

/// Result of `VaultManager::insert`.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Committed to `vault`. `redirected` is set when fracture isolation moved it off its route.
    Accepted {
        scar_id: String,
        vault: VaultId,
        redirected: bool,
    },
    /// Held back by friction; re-evaluated on each cycle under `ticket`.
    Delayed { ticket: u64, target: VaultId },
    Rejected { reason: RejectReason },
}

impl InsertOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, InsertOutcome::Accepted { .. })
    }

    /// Vault the scar landed in, if accepted.
    pub fn vault(&self) -> Option<VaultId> {
        match self {
            InsertOutcome::Accepted { vault, .. } => Some(*vault),
            _ => None,
        }
    }
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertOutcome::Accepted {
                scar_id,
                vault,
                redirected,
            } => {
                write!(f, "accepted {scar_id} into {vault}")?;
                if *redirected {
                    write!(f, " (redirected)")?;
                }
                Ok(())
            }
            InsertOutcome::Delayed { ticket, target } => {
                write!(f, "delayed as ticket {ticket} targeting {target}")
            }
            InsertOutcome::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}

/// Resolution state of a delayed insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TicketStatus {
    Pending { target: VaultId, cycles_waited: u32 },
    Accepted { scar_id: String, vault: VaultId },
    Rejected { reason: String },
    Unknown,
}
