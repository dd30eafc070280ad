pub mod audit_record;
pub mod fracture_state;
pub mod insert_outcome;
pub mod quarantine_event;
pub mod tombstone;
pub mod vault_metadata;

pub use audit_record::{AuditOperation, AuditRecord};
pub use fracture_state::{FractureState, FractureTransition};
pub use insert_outcome::{InsertOutcome, RejectReason, TicketStatus};
pub use quarantine_event::{QuarantineAction, QuarantineEvent};
pub use tombstone::Tombstone;
pub use vault_metadata::VaultMetadata;
