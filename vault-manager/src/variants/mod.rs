//! Specialized vault variants: an extra per-cycle transform run after base
//! maintenance, one implementation per capability.

pub mod compression;
pub mod contradiction;
pub mod fossil;
pub mod reactor;

use serde::{Deserialize, Serialize};
use vault_core::errors::VaultResult;
use vault_core::models::AuditRecord;
use vault_core::{VaultConfig, VaultId};
use vault_optimization::{CompressionOutcome, OptimizationEngine};
use vault_store::ScarStore;

pub use compression::CompressionVariant;
pub use contradiction::ContradictionVariant;
pub use fossil::FossilVariant;
pub use reactor::ReactorVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Fossil,
    Contradiction,
    Reactor,
    Compression,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fossil => "fossil",
            Self::Contradiction => "contradiction",
            Self::Reactor => "reactor",
            Self::Compression => "compression",
        }
    }
}

/// Inputs handed to a variant each cycle.
pub struct VariantContext<'a> {
    pub vault_id: VaultId,
    pub cycle: u64,
    pub config: &'a VaultConfig,
    pub engine: &'a OptimizationEngine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    pub kind: VariantKind,
    pub vault_id: VaultId,
    pub cycle: u64,
    /// Scars rewritten in place.
    pub mutated: Vec<String>,
    /// Scars created by the variant.
    pub synthesized: Vec<String>,
    pub compression: Option<CompressionOutcome>,
    /// Net change applied to the vault's entropy sum.
    pub entropy_delta: f64,
    pub audit: Vec<AuditRecord>,
}

impl VariantReport {
    pub fn new(kind: VariantKind, ctx: &VariantContext<'_>) -> Self {
        Self {
            kind,
            vault_id: ctx.vault_id,
            cycle: ctx.cycle,
            mutated: vec![],
            synthesized: vec![],
            compression: None,
            entropy_delta: 0.0,
            audit: vec![],
        }
    }
}

/// The per-cycle variant contract.
pub trait IVaultVariant: Send + Sync {
    fn kind(&self) -> VariantKind;

    /// Transform `store` once per cycle, after base maintenance.
    fn on_cycle(&mut self, store: &mut ScarStore, ctx: &VariantContext<'_>) -> VaultResult<VariantReport>;

    /// Override for the retention grace period used when pruning this vault.
    fn pruning_grace_passes(&self) -> Option<u32> {
        None
    }
}
