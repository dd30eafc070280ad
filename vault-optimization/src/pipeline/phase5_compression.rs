//! Phase 5: Memory compression.
//!
//! Entropy-triggered and independent of the pass triggers: when the vault's
//! entropy sum exceeds the threshold, one scar is compressed and the sum halved.

use rand::Rng;
use vault_core::config::OptimizationConfig;
use vault_core::errors::VaultResult;
use vault_retention::RetentionScorer;
use vault_store::ScarStore;

use super::compression::{compress_one, CompressionOutcome};

pub fn should_compress(store: &ScarStore, config: &OptimizationConfig) -> bool {
    store.entropy_sum() > config.compression_entropy_threshold
}

pub fn run<R: Rng>(
    store: &mut ScarStore,
    config: &OptimizationConfig,
    scorer: &RetentionScorer,
    rng: &mut R,
) -> VaultResult<Option<CompressionOutcome>> {
    if !should_compress(store, config) {
        return Ok(None);
    }
    compress_one(store, scorer, rng, config.compression_keep_features)
}
