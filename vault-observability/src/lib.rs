//! # vault-observability
//!
//! Tracing subscriber setup, structured events, span macros, the in-memory
//! audit trail, and per-vault metrics counters.

pub mod audit;
pub mod metrics;
pub mod tracing_setup;

pub use audit::AuditTrail;
pub use metrics::{MetricsCollector, VaultMetrics};
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
