//! 6-phase maintenance pipeline.

pub mod compaction;
pub mod compression;
pub mod phase1_pruning;
pub mod phase2_compaction;
pub mod phase3_reindex;
pub mod phase4_retention;
pub mod phase5_compression;
pub mod phase6_audit;

use vault_core::VaultId;

/// Per-pass inputs shared by every phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext {
    pub vault_id: VaultId,
    pub cycle: u64,
    /// 1-based pass number for this vault. 0 when no full pass is running.
    pub pass_number: u64,
    pub grace_passes: u32,
}
