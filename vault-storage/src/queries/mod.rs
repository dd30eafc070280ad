//! SQL for each table, on a borrowed connection or transaction.

pub mod audit_ops;
pub mod metadata_ops;
pub mod scar_ops;
pub mod tombstone_ops;
