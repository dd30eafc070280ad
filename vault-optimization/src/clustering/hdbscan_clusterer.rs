//! Default clusterer: HDBSCAN over the dense expression vector plus the
//! scar's entropy and angle coordinates.
//!
//! Min cluster size: 2, noise points are never compacted.

use std::collections::{BTreeSet, HashMap};

use hdbscan::{Hdbscan, HdbscanHyperParams};
use vault_core::errors::VaultResult;
use vault_core::traits::IScarClusterer;
use vault_core::Scar;

/// Feature weights for the composite vector.
const W_EXPRESSION: f32 = 0.70;
const W_ENTROPY: f32 = 0.20;
const W_ANGLE: f32 = 0.10;

/// Minimum cluster size for HDBSCAN.
const MIN_CLUSTER_SIZE: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct HdbscanClusterer {
    min_cluster_size: usize,
}

impl HdbscanClusterer {
    pub fn new() -> Self {
        Self { min_cluster_size: MIN_CLUSTER_SIZE }
    }

    pub fn with_min_cluster_size(min_cluster_size: usize) -> Self {
        Self { min_cluster_size: min_cluster_size.max(MIN_CLUSTER_SIZE) }
    }
}

impl Default for HdbscanClusterer {
    fn default() -> Self {
        Self::new()
    }
}

impl IScarClusterer for HdbscanClusterer {
    fn cluster(&self, scars: &[&Scar]) -> VaultResult<Vec<Vec<usize>>> {
        if scars.len() < self.min_cluster_size {
            return Ok(vec![]);
        }

        let features = build_features(scars);

        let hyper_params = HdbscanHyperParams::builder()
            .min_cluster_size(self.min_cluster_size)
            .min_samples(1)
            .build();

        let clusterer = Hdbscan::new(&features, hyper_params);
        let labels = match clusterer.cluster() {
            Ok(l) => l,
            Err(e) => {
                // Treat everything as noise.
                tracing::debug!(error = ?e, scars = scars.len(), "hdbscan clustering failed");
                return Ok(vec![]);
            }
        };

        let mut cluster_map: HashMap<i32, Vec<usize>> = HashMap::new();
        for (idx, &label) in labels.iter().enumerate() {
            if label >= 0 {
                cluster_map.entry(label).or_default().push(idx);
            }
        }

        let mut clusters: Vec<Vec<usize>> = cluster_map.into_values().collect();
        clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(clusters)
    }

    fn name(&self) -> &str {
        "hdbscan"
    }
}

/// Dense vectors over the union of expression keys, followed by the
/// normalized post-entropy and angle coordinates.
fn build_features(scars: &[&Scar]) -> Vec<Vec<f32>> {
    let keys: BTreeSet<&str> = scars
        .iter()
        .flat_map(|s| s.expression.features.keys().map(String::as_str))
        .collect();

    scars
        .iter()
        .map(|scar| {
            let mut features = Vec::with_capacity(keys.len() + 2);
            for key in &keys {
                let value = scar.expression.features.get(*key).copied().unwrap_or(0.0);
                features.push(value as f32 * W_EXPRESSION);
            }
            features.push(scar.post_entropy.clamp(0.0, 10.0) as f32 / 10.0 * W_ENTROPY);
            features.push(scar.cls_angle.rem_euclid(360.0) as f32 / 360.0 * W_ANGLE);
            features
        })
        .collect()
}
