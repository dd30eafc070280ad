//! Per-vault operation counters.

pub mod vault_metrics;

pub use vault_metrics::{MetricsCollector, VaultMetrics};
