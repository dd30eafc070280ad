//! Reactor vault: every pair of active scars with strongly overlapping
//! expressions reacts once, producing an additional combined scar. The
//! originals stay in place. Reaction products do not react further.

use std::collections::HashSet;

use vault_core::config::VariantConfig;
use vault_core::constants::REACTOR_RESOLVER;
use vault_core::errors::VaultResult;
use vault_core::models::{AuditOperation, AuditRecord};
use vault_core::{Expression, Scar};
use vault_optimization::pipeline::compaction::circular_mean_deg;
use vault_store::ScarStore;

use super::{IVaultVariant, VariantContext, VariantKind, VariantReport};

pub struct ReactorVariant {
    overlap_threshold: f64,
    reacted: HashSet<(String, String)>,
}

impl ReactorVariant {
    pub fn new(config: &VariantConfig) -> Self {
        Self {
            overlap_threshold: config.expression_overlap_threshold,
            reacted: HashSet::new(),
        }
    }

    /// Pairs that have already reacted.
    pub fn reacted_pairs(&self) -> usize {
        self.reacted.len()
    }

    /// Forget pairs with a member no longer held by the store.
    fn forget_departed(&mut self, store: &ScarStore) {
        self.reacted
            .retain(|(left, right)| store.contains(left) && store.contains(right));
    }
}

/// Combined scar for a reacting pair.
pub fn react(a: &Scar, b: &Scar) -> Scar {
    let geoids: Vec<String> = a.geoid_refs.union(&b.geoid_refs).cloned().collect();
    Scar::new(
        geoids,
        format!("reaction of {} and {}", a.scar_id, b.scar_id),
        (a.pre_entropy + b.pre_entropy) / 2.0,
        (a.post_entropy + b.post_entropy) / 2.0,
        circular_mean_deg([a.cls_angle, b.cls_angle]),
        ((a.semantic_polarity + b.semantic_polarity) / 2.0).clamp(-1.0, 1.0),
        a.current_vault,
    )
    .with_resolved_by(REACTOR_RESOLVER)
    .with_expression(Expression::average([&a.expression, &b.expression]))
    .with_mutation_frequency((a.mutation_frequency + b.mutation_frequency) / 2.0)
    .with_contradiction_score(a.contradiction_score.max(b.contradiction_score))
}

impl IVaultVariant for ReactorVariant {
    fn kind(&self) -> VariantKind {
        VariantKind::Reactor
    }

    fn on_cycle(&mut self, store: &mut ScarStore, ctx: &VariantContext<'_>) -> VaultResult<VariantReport> {
        self.forget_departed(store);
        let mut report = VariantReport::new(VariantKind::Reactor, ctx);
        let entropy_before = store.entropy_sum();

        let reactants: Vec<&Scar> = store
            .active_ids()
            .iter()
            .filter_map(|id| store.get(id))
            .filter(|s| s.resolved_by != REACTOR_RESOLVER)
            .collect();

        let mut products = Vec::new();
        for (i, a) in reactants.iter().enumerate() {
            for b in &reactants[i + 1..] {
                let key = (a.scar_id.clone(), b.scar_id.clone());
                if self.reacted.contains(&key) {
                    continue;
                }
                if a.expression.overlap(&b.expression) > self.overlap_threshold {
                    products.push((key, react(a, b)));
                }
            }
        }

        for ((left, right), product) in products {
            let product_id = product.scar_id.clone();
            self.reacted.insert((left.clone(), right.clone()));
            match store.insert(product) {
                Ok(()) => {
                    report.audit.push(
                        AuditRecord::new(AuditOperation::Synthesize, ctx.vault_id, ctx.cycle)
                            .with_ids(vec![left, right], vec![product_id.clone()])
                            .with_details(serde_json::json!({ "variant": VariantKind::Reactor.as_str() })),
                    );
                    report.synthesized.push(product_id);
                }
                Err(e) => {
                    tracing::warn!(
                        vault = %ctx.vault_id,
                        left = %left,
                        right = %right,
                        error = %e,
                        "reaction product not stored"
                    );
                }
            }
        }

        report.entropy_delta = store.entropy_sum() - entropy_before;
        Ok(report)
    }
}
