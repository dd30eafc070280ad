//! Expression compression and candidate selection.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};
use vault_core::errors::VaultResult;
use vault_core::scar::CompressedSummary;
use vault_core::{Expression, VaultId};
use vault_observability::tracing_setup::events;
use vault_retention::RetentionScorer;
use vault_store::ScarStore;

/// IRS values closer than this are treated as tied.
const TIE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub scar_id: String,
    pub irs: f64,
    pub entropy_before: f64,
    pub entropy_after: f64,
    pub features_before: usize,
    pub features_after: usize,
}

/// Keep the `keep` strongest features (by magnitude) and record a summary.
pub fn compress_expression(expression: &Expression, keep: usize) -> VaultResult<Expression> {
    let digest = expression.digest()?;
    let original_features = expression
        .compressed
        .as_ref()
        .map(|c| c.original_features)
        .unwrap_or_else(|| expression.len());

    let mut ranked: Vec<(&String, &f64)> = expression.features.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.truncate(keep);

    let mut compressed = Expression::from_features(ranked.into_iter().map(|(k, v)| (k.clone(), *v)));
    compressed.compressed = Some(CompressedSummary {
        original_features,
        kept_features: compressed.len(),
        digest,
    });
    Ok(compressed)
}

/// Lowest-IRS active scar, preferring uncompressed ones. Ties go to `rng`.
pub fn select_candidate<R: Rng>(
    store: &ScarStore,
    scorer: &RetentionScorer,
    rng: &mut R,
) -> Option<(String, f64)> {
    let mut pool: Vec<(String, f64)> = store
        .active_scars()
        .filter(|s| !s.expression.is_compressed())
        .map(|s| (s.scar_id.clone(), scorer.score(s)))
        .collect();
    if pool.is_empty() {
        pool = store
            .active_scars()
            .map(|s| (s.scar_id.clone(), scorer.score(s)))
            .collect();
    }

    let min = pool.iter().map(|(_, irs)| *irs).fold(f64::INFINITY, f64::min);
    let mut tied: Vec<(String, f64)> = pool
        .into_iter()
        .filter(|(_, irs)| (irs - min).abs() <= TIE_TOLERANCE)
        .collect();
    if tied.is_empty() {
        return None;
    }
    // Map iteration order is arbitrary; sort so a seeded rng is reproducible.
    tied.sort_by(|a, b| a.0.cmp(&b.0));
    let pick = rng.gen_range(0..tied.len());
    Some(tied.swap_remove(pick))
}

/// Compress one scar and halve the vault's entropy accumulator.
/// Returns None when the vault has no active scars.
pub fn compress_one<R: Rng>(
    store: &mut ScarStore,
    scorer: &RetentionScorer,
    rng: &mut R,
    keep_features: usize,
) -> VaultResult<Option<CompressionOutcome>> {
    let Some((scar_id, irs)) = select_candidate(store, scorer, rng) else {
        return Ok(None);
    };

    let (features_before, compressed) = match store.get(&scar_id) {
        Some(scar) => (scar.expression.len(), compress_expression(&scar.expression, keep_features)?),
        None => return Ok(None),
    };
    let features_after = compressed.len();

    store.update(&scar_id, |s| s.expression = compressed)?;

    let entropy_before = store.entropy_sum();
    store.scale_entropy(0.5);
    let entropy_after = store.entropy_sum();

    events::scar_compressed(&scar_id, store.vault_id(), entropy_before, entropy_after);

    Ok(Some(CompressionOutcome {
        scar_id,
        irs,
        entropy_before,
        entropy_after,
        features_before,
        features_after,
    }))
}

/// Audit details for a compression outcome.
pub fn describe(outcome: &CompressionOutcome, vault_id: VaultId) -> serde_json::Value {
    serde_json::json!({
        "vault": vault_id.as_str(),
        "scar_id": outcome.scar_id,
        "irs": outcome.irs,
        "features_before": outcome.features_before,
        "features_after": outcome.features_after,
    })
}
