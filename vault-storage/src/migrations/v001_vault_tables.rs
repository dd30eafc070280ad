//! v001: scars, vault_metadata, tombstones, audit_log.

use rusqlite::Connection;

use vault_core::errors::VaultResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VaultResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scars (
            scar_id        TEXT PRIMARY KEY,
            vault_id       TEXT NOT NULL,
            cls_angle      REAL NOT NULL,
            created_at_us  INTEGER NOT NULL,
            post_entropy   REAL NOT NULL,
            active         INTEGER NOT NULL,
            body           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_scars_vault ON scars(vault_id);
        CREATE INDEX IF NOT EXISTS idx_scars_angle ON scars(vault_id, cls_angle);
        CREATE INDEX IF NOT EXISTS idx_scars_created ON scars(vault_id, created_at_us);

        CREATE TABLE IF NOT EXISTS vault_metadata (
            vault_id       TEXT PRIMARY KEY,
            body           TEXT NOT NULL,
            saved_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS tombstones (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            scar_id        TEXT NOT NULL,
            vault_id       TEXT NOT NULL,
            cycle          INTEGER NOT NULL,
            reason         TEXT NOT NULL,
            stitched_into  TEXT,
            body           TEXT NOT NULL,
            removed_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tombstones_scar ON tombstones(scar_id);
        CREATE INDEX IF NOT EXISTS idx_tombstones_vault ON tombstones(vault_id);

        CREATE TABLE IF NOT EXISTS audit_log (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            vault_id       TEXT NOT NULL,
            operation      TEXT NOT NULL,
            cycle          INTEGER NOT NULL,
            body           TEXT NOT NULL,
            timestamp      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_audit_vault ON audit_log(vault_id);
        CREATE INDEX IF NOT EXISTS idx_audit_operation ON audit_log(operation);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
