//! Secondary indices keyed on scar id, CLS angle, and creation time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use vault_core::constants::ANGLE_INDEX_SCALE;
use vault_core::Scar;

/// Quantize an angle to the index resolution.
pub fn angle_key(angle: f64) -> i64 {
    (angle * ANGLE_INDEX_SCALE).round() as i64
}

/// Lookup indices over every scar held by a store (active or not).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScarIndex {
    ids: BTreeSet<String>,
    by_angle: BTreeMap<i64, BTreeSet<String>>,
    by_created: BTreeMap<DateTime<Utc>, BTreeSet<String>>,
}

impl ScarIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from scratch over `scars`.
    pub fn build<'a, I>(scars: I) -> Self
    where
        I: IntoIterator<Item = &'a Scar>,
    {
        let mut index = Self::new();
        for scar in scars {
            index.add(scar);
        }
        index
    }

    pub fn add(&mut self, scar: &Scar) {
        self.ids.insert(scar.scar_id.clone());
        self.by_angle
            .entry(angle_key(scar.cls_angle))
            .or_default()
            .insert(scar.scar_id.clone());
        self.by_created
            .entry(scar.created_at)
            .or_default()
            .insert(scar.scar_id.clone());
    }

    pub fn remove(&mut self, scar: &Scar) {
        self.ids.remove(&scar.scar_id);
        let key = angle_key(scar.cls_angle);
        if let Some(bucket) = self.by_angle.get_mut(&key) {
            bucket.remove(&scar.scar_id);
            if bucket.is_empty() {
                self.by_angle.remove(&key);
            }
        }
        if let Some(bucket) = self.by_created.get_mut(&scar.created_at) {
            bucket.remove(&scar.scar_id);
            if bucket.is_empty() {
                self.by_created.remove(&scar.created_at);
            }
        }
    }

    /// Number of ids in the primary index.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, scar_id: &str) -> bool {
        self.ids.contains(scar_id)
    }

    /// Entry counts of the angle and creation-time indices.
    pub fn secondary_counts(&self) -> (usize, usize) {
        (
            self.by_angle.values().map(BTreeSet::len).sum(),
            self.by_created.values().map(BTreeSet::len).sum(),
        )
    }

    /// Ids with `lo <= cls_angle <= hi`, ordered by angle.
    pub fn angle_range(&self, lo: f64, hi: f64) -> Vec<String> {
        if lo > hi {
            return Vec::new();
        }
        self.by_angle
            .range(angle_key(lo)..=angle_key(hi))
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    /// Ids with `from <= created_at <= to`, ordered by creation time.
    pub fn created_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<String> {
        if from > to {
            return Vec::new();
        }
        self.by_created
            .range(from..=to)
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }
}
