use crate::errors::VaultResult;
use crate::scar::Scar;

/// Groups scars into similarity clusters for composite compaction.
pub trait IScarClusterer: Send + Sync {
    /// Return clusters as index lists into `scars`. Unclustered (noise) scars are omitted.
    fn cluster(&self, scars: &[&Scar]) -> VaultResult<Vec<Vec<usize>>>;

    /// Clusterer name for audit details.
    fn name(&self) -> &str;
}
