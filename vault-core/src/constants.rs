/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of vaults owned by a manager.
pub const VAULT_COUNT: usize = 2;

/// Angle index resolution: angles are keyed in micro-degrees.
pub const ANGLE_INDEX_SCALE: f64 = 1_000_000.0;

/// `resolved_by` marker for scars synthesized by composite compaction.
pub const COMPACTION_RESOLVER: &str = "vault.compaction";

/// `resolved_by` marker for scars synthesized by the reactor vault.
pub const REACTOR_RESOLVER: &str = "vault.reactor";
