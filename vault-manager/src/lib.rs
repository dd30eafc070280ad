//! # vault-manager
//!
//! Owns the two Scar Stores and everything that spans them: routing,
//! friction delay with tickets, fracture redirects, the per-cycle driver,
//! specialized vault variants, and an optional tokio cycle clock.

pub mod clock;
pub mod delay;
pub mod manager;
pub mod report;
pub mod routing;
pub mod variants;

pub use clock::CycleClock;
pub use manager::VaultManager;
pub use report::CycleReport;
pub use routing::{route, RouteDecision, RouteRule};
pub use variants::{IVaultVariant, VariantContext, VariantKind, VariantReport};
