use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::VaultResult;

/// Marker left on an expression that has been replaced by a compressed summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedSummary {
    /// Feature count before the first compression.
    pub original_features: usize,
    /// Feature count kept by the summary.
    pub kept_features: usize,
    /// blake3 digest of the pre-compression feature map.
    pub digest: String,
}

/// Opaque feature map used for similarity and overlap computations.
///
/// Produced upstream by the embedding collaborator; the vault only compares,
/// averages, perturbs, and compresses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub features: BTreeMap<String, f64>,
    #[serde(default)]
    pub compressed: Option<CompressedSummary>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an expression from `(feature, weight)` pairs.
    pub fn from_features<K, I>(features: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            features: features.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            compressed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed.is_some()
    }

    /// Cosine similarity over the union of feature keys.
    /// Returns 0.0 when either side is empty or has zero magnitude.
    pub fn overlap(&self, other: &Expression) -> f64 {
        if self.features.is_empty() || other.features.is_empty() {
            return 0.0;
        }
        let mut dot = 0.0f64;
        for (key, a) in &self.features {
            if let Some(b) = other.features.get(key) {
                dot += a * b;
            }
        }
        let denom = self.magnitude() * other.magnitude();
        if denom < f64::EPSILON {
            0.0
        } else {
            (dot / denom).clamp(-1.0, 1.0)
        }
    }

    /// Euclidean norm of the feature weights.
    pub fn magnitude(&self) -> f64 {
        self.features.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Element-wise mean over the union of keys. Missing features count as 0.
    pub fn average<'a, I>(expressions: I) -> Expression
    where
        I: IntoIterator<Item = &'a Expression>,
    {
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        let mut count = 0usize;
        for expr in expressions {
            count += 1;
            for (key, value) in &expr.features {
                *sums.entry(key.clone()).or_insert(0.0) += value;
            }
        }
        if count == 0 {
            return Expression::default();
        }
        let n = count as f64;
        Expression {
            features: sums.into_iter().map(|(k, v)| (k, v / n)).collect(),
            compressed: None,
        }
    }

    /// blake3 digest of the serialized feature map.
    pub fn digest(&self) -> VaultResult<String> {
        let serialized = serde_json::to_string(&self.features)?;
        Ok(blake3::hash(serialized.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_expressions_fully_overlap() {
        let e = Expression::from_features([("a", 1.0), ("b", 2.0)]);
        assert!((e.overlap(&e) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_expressions_do_not_overlap() {
        let a = Expression::from_features([("a", 1.0)]);
        let b = Expression::from_features([("b", 1.0)]);
        assert!(a.overlap(&b).abs() < 1e-9);
    }

    #[test]
    fn empty_expression_overlap_is_zero() {
        let a = Expression::new();
        let b = Expression::from_features([("b", 1.0)]);
        assert_eq!(a.overlap(&b), 0.0);
    }

    #[test]
    fn average_fills_missing_with_zero() {
        let a = Expression::from_features([("x", 2.0)]);
        let b = Expression::from_features([("y", 4.0)]);
        let avg = Expression::average([&a, &b]);
        assert_eq!(avg.features["x"], 1.0);
        assert_eq!(avg.features["y"], 2.0);
    }

    #[test]
    fn digest_is_stable() {
        let a = Expression::from_features([("x", 2.0), ("y", 1.0)]);
        let b = Expression::from_features([("y", 1.0), ("x", 2.0)]);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }
}
