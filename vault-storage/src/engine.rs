//! SqliteVaultStorage: owns the connection, runs migrations at open, and
//! implements the tombstone archive used by maintenance.

use std::path::Path;

use chrono::{DateTime, Utc};

use vault_core::errors::VaultResult;
use vault_core::models::{AuditRecord, Tombstone};
use vault_core::traits::IScarArchive;
use vault_core::{Scar, VaultId, VaultMetadata};
use vault_store::ScarStore;

use crate::migrations;
use crate::pool::{pragmas, WriteConnection};
use crate::queries::{audit_ops, metadata_ops, scar_ops, tombstone_ops};
use crate::to_storage_err;

pub struct SqliteVaultStorage {
    writer: WriteConnection,
}

impl SqliteVaultStorage {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: &Path) -> VaultResult<Self> {
        let storage = Self { writer: WriteConnection::open(path)? };
        storage.initialize()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> VaultResult<Self> {
        let storage = Self { writer: WriteConnection::open_in_memory()? };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&self) -> VaultResult<()> {
        self.writer.with_conn_sync(|conn| {
            let version = migrations::run_migrations(conn)?;
            tracing::debug!(version, "vault storage ready");
            Ok(())
        })
    }

    pub fn schema_version(&self) -> VaultResult<u32> {
        self.writer.with_conn_sync(migrations::current_version)
    }

    pub fn is_wal(&self) -> VaultResult<bool> {
        self.writer.with_conn_sync(pragmas::verify_wal_mode)
    }

    /// Replace the persisted snapshot of one vault with the store's contents.
    /// Scars and metadata are written in a single transaction.
    pub fn save_vault(&self, store: &ScarStore) -> VaultResult<usize> {
        let vault = store.vault_id();
        self.writer.with_conn_sync(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("save_vault begin: {e}")))?;

            scar_ops::delete_vault_scars(&tx, vault)?;
            let mut written = 0;
            for scar in store.scars() {
                scar_ops::insert_scar(&tx, scar)?;
                written += 1;
            }
            metadata_ops::upsert_metadata(&tx, &store.metadata())?;

            tx.commit()
                .map_err(|e| to_storage_err(format!("save_vault commit: {e}")))?;
            tracing::info!(vault = %vault, scars = written, "vault snapshot saved");
            Ok(written)
        })
    }

    /// Rebuild a vault from its last snapshot. A vault never saved loads empty.
    pub fn load_vault(&self, vault: VaultId, capacity: usize) -> VaultResult<ScarStore> {
        let (scars, metadata) = self.writer.with_conn_sync(|conn| {
            Ok((scar_ops::vault_scars(conn, vault)?, metadata_ops::get_metadata(conn, vault)?))
        })?;

        let Some(metadata) = metadata else {
            if !scars.is_empty() {
                tracing::warn!(vault = %vault, scars = scars.len(), "scars stored without metadata");
            }
            let mut store = ScarStore::new(vault, capacity);
            for scar in scars {
                store.insert(scar)?;
            }
            return Ok(store);
        };

        let loaded = scars.len();
        let store = ScarStore::restore(capacity, scars, &metadata)?;
        tracing::info!(vault = %vault, scars = loaded, "vault snapshot loaded");
        Ok(store)
    }

    pub fn metadata(&self, vault: VaultId) -> VaultResult<Option<VaultMetadata>> {
        self.writer.with_conn_sync(|conn| metadata_ops::get_metadata(conn, vault))
    }

    pub fn get_scar(&self, scar_id: &str) -> VaultResult<Option<Scar>> {
        self.writer.with_conn_sync(|conn| scar_ops::get_scar(conn, scar_id))
    }

    pub fn scar_count(&self, vault: VaultId) -> VaultResult<usize> {
        self.writer.with_conn_sync(|conn| scar_ops::count_scars(conn, vault))
    }

    /// Persisted scars with `lo <= cls_angle <= hi`, ordered by angle.
    pub fn scars_in_angle_range(&self, vault: VaultId, lo: f64, hi: f64) -> VaultResult<Vec<Scar>> {
        self.writer.with_conn_sync(|conn| scar_ops::angle_range(conn, vault, lo, hi))
    }

    /// Persisted scars created within `[from, to]`, ordered by creation time.
    pub fn scars_created_between(
        &self,
        vault: VaultId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> VaultResult<Vec<Scar>> {
        self.writer.with_conn_sync(|conn| scar_ops::created_range(conn, vault, from, to))
    }

    pub fn append_audit<'a, I>(&self, records: I) -> VaultResult<usize>
    where
        I: IntoIterator<Item = &'a AuditRecord>,
    {
        self.writer.with_conn_sync(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("append_audit begin: {e}")))?;
            let mut n = 0;
            for record in records {
                audit_ops::insert_record(&tx, record)?;
                n += 1;
            }
            tx.commit()
                .map_err(|e| to_storage_err(format!("append_audit commit: {e}")))?;
            Ok(n)
        })
    }

    pub fn audit_records(&self, vault: VaultId) -> VaultResult<Vec<AuditRecord>> {
        self.writer.with_conn_sync(|conn| audit_ops::records_for_vault(conn, vault))
    }

    pub fn audit_count(&self, operation: &str) -> VaultResult<usize> {
        self.writer.with_conn_sync(|conn| audit_ops::count_by_operation(conn, operation))
    }

    pub fn tombstones(&self) -> VaultResult<Vec<Tombstone>> {
        self.writer.with_conn_sync(tombstone_ops::all_tombstones)
    }

    /// Scars folded into the composite `latent_id` by compaction.
    pub fn stitched_sources(&self, latent_id: &str) -> VaultResult<Vec<String>> {
        self.writer.with_conn_sync(|conn| tombstone_ops::stitched_sources(conn, latent_id))
    }
}

impl IScarArchive for SqliteVaultStorage {
    fn write_tombstone(&self, tombstone: &Tombstone) -> VaultResult<()> {
        self.writer.with_conn_sync(|conn| tombstone_ops::insert_tombstone(conn, tombstone))
    }
}
