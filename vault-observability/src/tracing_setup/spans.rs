//! Span definitions per operation: cycle, maintenance, routing.

/// Create a cycle span.
#[macro_export]
macro_rules! cycle_span {
    ($cycle:expr) => {
        tracing::info_span!("vault.cycle", cycle = $cycle)
    };
}

/// Create a maintenance pass span.
#[macro_export]
macro_rules! maintenance_span {
    ($vault:expr, $cycle:expr) => {
        tracing::info_span!("vault.maintenance", vault = %$vault, cycle = $cycle)
    };
}

/// Create a routing span.
#[macro_export]
macro_rules! routing_span {
    ($scar_id:expr) => {
        tracing::debug_span!("vault.routing", scar_id = %$scar_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CYCLE: &str = "vault.cycle";
    pub const MAINTENANCE: &str = "vault.maintenance";
    pub const ROUTING: &str = "vault.routing";
}
