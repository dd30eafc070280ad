//! # vault-optimization
//!
//! 6-phase maintenance pass: drift collapse pruning → composite compaction →
//! reindexing → retention scoring → memory compression → audit reporting.
//! Passes are trigger-driven; compression also runs on its own entropy trigger.
//! A pass that hits a store-wide invariant violation is rolled back.

pub mod clustering;
pub mod engine;
pub mod history;
pub mod pipeline;
pub mod scheduling;

pub use clustering::HdbscanClusterer;
pub use engine::{OptimizationEngine, PassReport};
pub use history::VaultHistory;
pub use pipeline::compression::{compress_expression, CompressionOutcome};
pub use scheduling::{collect_signals, evaluate_triggers, TriggerReason, TriggerSignals};
