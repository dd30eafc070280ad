//! ScarStore: one vault's scars, indices, and aggregate counters.
//!
//! Single-writer: callers serialize mutations (the manager holds one lock per store).
//! Scars are updated by replacement so aggregates always reflect the stored value.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vault_core::errors::{CapacityError, IndexError, VaultResult};
use vault_core::{Scar, VaultId, VaultMetadata};

use crate::index::ScarIndex;

const ANGLE_EPSILON: f64 = 1e-9;

fn unit(angle_deg: f64) -> (f64, f64) {
    angle_deg.to_radians().sin_cos()
}

/// Outcome of a successful reindex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    pub vault_id: VaultId,
    /// Entries in the rebuilt primary index.
    pub entries: usize,
    pub active: usize,
    /// Store generation the index was rebuilt at.
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct ScarStore {
    vault_id: VaultId,
    scars: HashMap<String, Scar>,
    index: ScarIndex,
    max_active: usize,
    total_scars: u64,
    active_count: usize,
    entropy_sum: f64,
    /// Unit-vector sums of active angles; the mean angle is circular.
    angle_sin: f64,
    angle_cos: f64,
    incoming_load: u64,
    outgoing_load: u64,
    incoming_load_last_cycle: u64,
    outgoing_load_last_cycle: u64,
    friction_metric: f64,
    generation: u64,
}

impl ScarStore {
    pub fn new(vault_id: VaultId, max_active: usize) -> Self {
        Self {
            vault_id,
            scars: HashMap::new(),
            index: ScarIndex::new(),
            max_active,
            total_scars: 0,
            active_count: 0,
            entropy_sum: 0.0,
            angle_sin: 0.0,
            angle_cos: 0.0,
            incoming_load: 0,
            outgoing_load: 0,
            incoming_load_last_cycle: 0,
            outgoing_load_last_cycle: 0,
            friction_metric: 0.0,
            generation: 0,
        }
    }

    /// Rebuild a store from persisted scars and aggregates.
    ///
    /// Scars are loaded without counting as incoming load. The entropy sum is
    /// taken from `metadata` since compression accounting is not derivable
    /// from the scars alone.
    pub fn restore<I>(max_active: usize, scars: I, metadata: &VaultMetadata) -> VaultResult<Self>
    where
        I: IntoIterator<Item = Scar>,
    {
        let mut store = Self::new(metadata.vault_id, max_active);
        for scar in scars {
            store.insert(scar)?;
        }
        store.incoming_load = 0;
        store.entropy_sum = if store.active_count > 0 {
            metadata.entropy_sum.max(0.0)
        } else {
            0.0
        };
        store.total_scars = store.total_scars.max(metadata.total_scars);
        store.generation = metadata.generation;
        store.set_friction_metric(metadata.friction_metric);
        Ok(store)
    }

    pub fn vault_id(&self) -> VaultId {
        self.vault_id
    }

    pub fn capacity(&self) -> usize {
        self.max_active
    }

    /// Every scar held, active or not.
    pub fn len(&self) -> usize {
        self.scars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scars.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn total_scars(&self) -> u64 {
        self.total_scars
    }

    pub fn entropy_sum(&self) -> f64 {
        self.entropy_sum
    }

    /// Circular mean of the active scars' CLS angles, in [0, 360).
    /// Zero when empty or when the angles cancel out.
    pub fn avg_cls_angle(&self) -> f64 {
        if self.active_count == 0 || self.angle_sin.hypot(self.angle_cos) < ANGLE_EPSILON {
            return 0.0;
        }
        self.angle_sin.atan2(self.angle_cos).to_degrees().rem_euclid(360.0)
    }

    pub fn friction_metric(&self) -> f64 {
        self.friction_metric
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Inserts committed during the current (unfinished) cycle.
    pub fn incoming_load(&self) -> u64 {
        self.incoming_load
    }

    pub fn outgoing_load(&self) -> u64 {
        self.outgoing_load
    }

    pub fn incoming_load_last_cycle(&self) -> u64 {
        self.incoming_load_last_cycle
    }

    pub fn outgoing_load_last_cycle(&self) -> u64 {
        self.outgoing_load_last_cycle
    }

    pub fn index(&self) -> &ScarIndex {
        &self.index
    }

    pub fn contains(&self, scar_id: &str) -> bool {
        self.scars.contains_key(scar_id)
    }

    pub fn get(&self, scar_id: &str) -> Option<&Scar> {
        self.scars.get(scar_id)
    }

    pub fn scars(&self) -> impl Iterator<Item = &Scar> {
        self.scars.values()
    }

    pub fn active_scars(&self) -> impl Iterator<Item = &Scar> {
        self.scars.values().filter(|s| s.is_active())
    }

    /// Active scar ids, sorted for deterministic iteration.
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active_scars().map(|s| s.scar_id.clone()).collect();
        ids.sort();
        ids
    }

    /// Insert a scar. The store takes ownership and stamps `current_vault`.
    pub fn insert(&mut self, mut scar: Scar) -> VaultResult<()> {
        if self.scars.contains_key(&scar.scar_id) {
            return Err(IndexError::DuplicateScarId {
                scar_id: scar.scar_id,
            }
            .into());
        }
        if scar.is_active() && self.active_count >= self.max_active {
            return Err(CapacityError::VaultFull {
                vault: self.vault_id,
                active: self.active_count,
                limit: self.max_active,
            }
            .into());
        }

        scar.current_vault = self.vault_id;
        self.index.add(&scar);
        self.add_contribution(&scar);
        self.total_scars += 1;
        self.incoming_load += 1;
        self.generation += 1;
        debug!(vault = %self.vault_id, scar_id = %scar.scar_id, "scar stored");
        self.scars.insert(scar.scar_id.clone(), scar);
        Ok(())
    }

    /// Put back a scar that was taken out of this store by `remove`.
    ///
    /// Undoes the removal's outgoing load instead of counting a new arrival:
    /// `total_scars` and `incoming_load` are untouched.
    pub fn reinstate(&mut self, mut scar: Scar) -> VaultResult<()> {
        if self.scars.contains_key(&scar.scar_id) {
            return Err(IndexError::DuplicateScarId {
                scar_id: scar.scar_id,
            }
            .into());
        }
        if scar.is_active() && self.active_count >= self.max_active {
            return Err(CapacityError::VaultFull {
                vault: self.vault_id,
                active: self.active_count,
                limit: self.max_active,
            }
            .into());
        }

        scar.current_vault = self.vault_id;
        self.index.add(&scar);
        self.add_contribution(&scar);
        self.outgoing_load = self.outgoing_load.saturating_sub(1);
        self.generation += 1;
        debug!(vault = %self.vault_id, scar_id = %scar.scar_id, "scar reinstated");
        self.scars.insert(scar.scar_id.clone(), scar);
        Ok(())
    }

    /// Hard-remove a scar, returning it.
    pub fn remove(&mut self, scar_id: &str) -> Option<Scar> {
        let scar = self.scars.remove(scar_id)?;
        self.index.remove(&scar);
        self.remove_contribution(&scar);
        self.outgoing_load += 1;
        self.generation += 1;
        Some(scar)
    }

    /// Replace a stored scar with an updated value, returning the previous one.
    pub fn replace(&mut self, mut scar: Scar) -> VaultResult<Scar> {
        let previous = self
            .scars
            .remove(&scar.scar_id)
            .ok_or_else(|| IndexError::UnknownScar {
                scar_id: scar.scar_id.clone(),
            })?;
        self.index.remove(&previous);

        match (previous.is_active(), scar.is_active()) {
            (true, true) => {
                // Adjust by difference so unchanged fields leave aggregates bit-exact.
                if scar.post_entropy != previous.post_entropy {
                    self.entropy_sum =
                        (self.entropy_sum + scar.post_entropy - previous.post_entropy).max(0.0);
                }
                if scar.cls_angle != previous.cls_angle {
                    let (old_sin, old_cos) = unit(previous.cls_angle);
                    let (new_sin, new_cos) = unit(scar.cls_angle);
                    self.angle_sin += new_sin - old_sin;
                    self.angle_cos += new_cos - old_cos;
                }
            }
            (true, false) => self.remove_contribution(&previous),
            (false, true) => self.add_contribution(&scar),
            (false, false) => {}
        }

        scar.current_vault = self.vault_id;
        self.index.add(&scar);
        self.generation += 1;
        self.scars.insert(scar.scar_id.clone(), scar);
        Ok(previous)
    }

    /// Copy-modify-store: apply `f` to a copy of the scar, then replace.
    pub fn update<F>(&mut self, scar_id: &str, f: F) -> VaultResult<()>
    where
        F: FnOnce(&mut Scar),
    {
        let mut copy = self
            .scars
            .get(scar_id)
            .cloned()
            .ok_or_else(|| IndexError::UnknownScar {
                scar_id: scar_id.to_string(),
            })?;
        f(&mut copy);
        self.replace(copy)?;
        Ok(())
    }

    /// Multiply the entropy accumulator (compression accounting).
    pub fn scale_entropy(&mut self, factor: f64) {
        self.entropy_sum = (self.entropy_sum * factor).max(0.0);
        self.generation += 1;
    }

    /// Add a signed delta to the entropy accumulator, floored at zero.
    pub fn add_entropy(&mut self, delta: f64) {
        self.entropy_sum = (self.entropy_sum + delta).max(0.0);
        self.generation += 1;
    }

    /// Inject a measured friction value. Clamped to [0, 1].
    pub fn set_friction_metric(&mut self, value: f64) {
        self.friction_metric = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Close the current cycle's load counters.
    pub fn roll_cycle(&mut self) {
        self.incoming_load_last_cycle = self.incoming_load;
        self.outgoing_load_last_cycle = self.outgoing_load;
        self.incoming_load = 0;
        self.outgoing_load = 0;
    }

    /// Sum of `post_entropy` over active scars, ignoring accounting adjustments.
    pub fn recomputed_entropy_sum(&self) -> f64 {
        self.active_scars().map(|s| s.post_entropy).sum()
    }

    /// Rebuild the lookup indices.
    ///
    /// The new index is built aside and swapped in only when its entry count
    /// matches the primary map and the active count matches `expected_active`.
    pub fn reindex(&mut self, expected_active: usize) -> VaultResult<ReindexReport> {
        let rebuilt = ScarIndex::build(self.scars.values());

        let (by_angle, by_created) = rebuilt.secondary_counts();
        for (stage, actual) in [
            ("primary index", rebuilt.len()),
            ("angle index", by_angle),
            ("created_at index", by_created),
        ] {
            if actual != self.scars.len() {
                return Err(IndexError::InconsistentIndex {
                    stage: stage.to_string(),
                    expected: self.scars.len(),
                    actual,
                }
                .into());
            }
        }

        let active = self.scars.values().filter(|s| s.is_active()).count();
        if active != expected_active || active != self.active_count {
            return Err(IndexError::InconsistentIndex {
                stage: "active count".to_string(),
                expected: expected_active,
                actual: active,
            }
            .into());
        }

        self.index = rebuilt;
        Ok(ReindexReport {
            vault_id: self.vault_id,
            entries: self.index.len(),
            active,
            generation: self.generation,
        })
    }

    /// Fraction of active scars sharing at least one geoid with another active scar.
    pub fn thread_overlap(&self) -> f64 {
        let mut refs: HashMap<&str, usize> = HashMap::new();
        for scar in self.active_scars() {
            for geoid in &scar.geoid_refs {
                *refs.entry(geoid.as_str()).or_insert(0) += 1;
            }
        }

        let active = self.active_count();
        if active == 0 {
            return 0.0;
        }
        let overlapping = self
            .active_scars()
            .filter(|s| s.geoid_refs.iter().any(|g| refs.get(g.as_str()).is_some_and(|n| *n > 1)))
            .count();
        overlapping as f64 / active as f64
    }

    /// Scars with `lo <= cls_angle <= hi`, ordered by angle.
    pub fn scars_in_angle_range(&self, lo: f64, hi: f64) -> Vec<&Scar> {
        self.index
            .angle_range(lo, hi)
            .iter()
            .filter_map(|id| self.scars.get(id))
            .collect()
    }

    /// Scars created within `[from, to]`, ordered by creation time.
    pub fn scars_created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Scar> {
        self.index
            .created_range(from, to)
            .iter()
            .filter_map(|id| self.scars.get(id))
            .collect()
    }

    /// Read-only snapshot of the aggregate counters.
    pub fn metadata(&self) -> VaultMetadata {
        VaultMetadata {
            vault_id: self.vault_id,
            total_scars: self.total_scars,
            active_scars: self.active_count,
            entropy_sum: self.entropy_sum,
            avg_cls_angle: self.avg_cls_angle(),
            friction_metric: self.friction_metric,
            incoming_load_last_cycle: self.incoming_load_last_cycle,
            outgoing_load_last_cycle: self.outgoing_load_last_cycle,
            generation: self.generation,
        }
    }

    fn add_contribution(&mut self, scar: &Scar) {
        if scar.is_active() {
            self.active_count += 1;
            self.entropy_sum += scar.post_entropy;
            let (sin, cos) = unit(scar.cls_angle);
            self.angle_sin += sin;
            self.angle_cos += cos;
        }
    }

    fn remove_contribution(&mut self, scar: &Scar) {
        if scar.is_active() {
            self.active_count = self.active_count.saturating_sub(1);
            self.entropy_sum = (self.entropy_sum - scar.post_entropy).max(0.0);
            let (sin, cos) = unit(scar.cls_angle);
            self.angle_sin -= sin;
            self.angle_cos -= cos;
            if self.active_count == 0 {
                self.angle_sin = 0.0;
                self.angle_cos = 0.0;
            }
        }
    }
}
