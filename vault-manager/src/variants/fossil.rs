//! Fossil vault: no per-cycle mutation, only a slower eviction profile.

use vault_core::config::VariantConfig;
use vault_core::errors::VaultResult;
use vault_store::ScarStore;

use super::{IVaultVariant, VariantContext, VariantKind, VariantReport};

#[derive(Debug, Clone, Copy)]
pub struct FossilVariant {
    grace_passes: u32,
}

impl FossilVariant {
    pub fn new(config: &VariantConfig) -> Self {
        Self { grace_passes: config.fossil_grace_passes }
    }
}

impl IVaultVariant for FossilVariant {
    fn kind(&self) -> VariantKind {
        VariantKind::Fossil
    }

    fn on_cycle(&mut self, _store: &mut ScarStore, ctx: &VariantContext<'_>) -> VaultResult<VariantReport> {
        Ok(VariantReport::new(VariantKind::Fossil, ctx))
    }

    fn pruning_grace_passes(&self) -> Option<u32> {
        Some(self.grace_passes)
    }
}
