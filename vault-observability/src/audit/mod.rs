//! Bounded in-memory audit trail.

pub mod trail;

pub use trail::AuditTrail;
