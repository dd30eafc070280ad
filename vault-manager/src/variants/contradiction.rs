//! Contradiction vault: scars with a high contradiction score get a bounded
//! random mutation of their expression each cycle. The mean absolute
//! perturbation is added to the scar's post-entropy and so to the vault sum.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vault_core::config::VariantConfig;
use vault_core::errors::VaultResult;
use vault_core::models::{AuditOperation, AuditRecord};
use vault_store::ScarStore;

use super::{IVaultVariant, VariantContext, VariantKind, VariantReport};

pub struct ContradictionVariant {
    score_threshold: f64,
    amplitude: f64,
    rng: StdRng,
}

impl ContradictionVariant {
    pub fn new(config: &VariantConfig, seed: Option<u64>) -> Self {
        Self {
            score_threshold: config.contradiction_mutation_score,
            amplitude: config.contradiction_mutation_amplitude.abs(),
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }
}

impl IVaultVariant for ContradictionVariant {
    fn kind(&self) -> VariantKind {
        VariantKind::Contradiction
    }

    fn on_cycle(&mut self, store: &mut ScarStore, ctx: &VariantContext<'_>) -> VaultResult<VariantReport> {
        let mut report = VariantReport::new(VariantKind::Contradiction, ctx);
        let entropy_before = store.entropy_sum();

        let targets: Vec<String> = store
            .active_ids()
            .into_iter()
            .filter(|id| {
                store.get(id).is_some_and(|s| {
                    s.contradiction_score > self.score_threshold && !s.expression.is_empty()
                })
            })
            .collect();

        for scar_id in targets {
            let Some(scar) = store.get(&scar_id) else {
                continue;
            };
            let mut expression = scar.expression.clone();
            let mut total = 0.0;
            for value in expression.features.values_mut() {
                let perturbation = self.rng.gen_range(-self.amplitude..=self.amplitude);
                *value += perturbation;
                total += perturbation.abs();
            }
            let delta = total / expression.len() as f64;

            store.update(&scar_id, |s| {
                s.expression = expression;
                s.post_entropy += delta;
                s.delta_entropy = s.post_entropy - s.pre_entropy;
            })?;
            report.mutated.push(scar_id);
        }

        report.entropy_delta = store.entropy_sum() - entropy_before;
        if !report.mutated.is_empty() {
            report.audit.push(
                AuditRecord::new(AuditOperation::Mutate, ctx.vault_id, ctx.cycle)
                    .with_ids(report.mutated.clone(), report.mutated.clone())
                    .with_details(serde_json::json!({
                        "variant": VariantKind::Contradiction.as_str(),
                        "entropy_delta": report.entropy_delta,
                    })),
            );
        }
        Ok(report)
    }
}
