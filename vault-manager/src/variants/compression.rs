//! Compression vault: compresses one scar every cycle, with no entropy threshold.

use vault_core::errors::VaultResult;
use vault_core::models::{AuditOperation, AuditRecord};
use vault_store::ScarStore;

use super::{IVaultVariant, VariantContext, VariantKind, VariantReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionVariant;

impl IVaultVariant for CompressionVariant {
    fn kind(&self) -> VariantKind {
        VariantKind::Compression
    }

    fn on_cycle(&mut self, store: &mut ScarStore, ctx: &VariantContext<'_>) -> VaultResult<VariantReport> {
        let mut report = VariantReport::new(VariantKind::Compression, ctx);
        if let Some(outcome) = ctx.engine.compress_now(store)? {
            report.entropy_delta = outcome.entropy_after - outcome.entropy_before;
            report.mutated.push(outcome.scar_id.clone());
            report.audit.push(
                AuditRecord::new(AuditOperation::Compress, ctx.vault_id, ctx.cycle)
                    .with_ids(vec![outcome.scar_id.clone()], vec![outcome.scar_id.clone()])
                    .with_details(serde_json::json!({
                        "variant": VariantKind::Compression.as_str(),
                        "entropy_before": outcome.entropy_before,
                        "entropy_after": outcome.entropy_after,
                    })),
            );
            report.compression = Some(outcome);
        }
        Ok(report)
    }
}
