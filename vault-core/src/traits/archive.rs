use crate::errors::VaultResult;
use crate::models::Tombstone;

/// Durable archive for pruned scars.
pub trait IScarArchive: Send + Sync {
    fn write_tombstone(&self, tombstone: &Tombstone) -> VaultResult<()>;
}
