use crate::models::QuarantineEvent;
use crate::scar::VaultId;

/// Suspension-layer collaborator receiving quarantine events.
pub trait IQuarantineSink: Send + Sync {
    fn on_quarantine(&self, event: &QuarantineEvent);
}

/// Pressure-diffusion collaborator notified of entropy changes.
pub trait IEntropySink: Send + Sync {
    fn entropy_changed(&self, vault_id: VaultId, before: f64, after: f64, cycle: u64);
}
