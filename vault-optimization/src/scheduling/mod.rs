//! Trigger evaluation for maintenance passes.

pub mod signals;
pub mod triggers;

pub use signals::collect_signals;
pub use triggers::{evaluate_triggers, TriggerReason, TriggerSignals};
