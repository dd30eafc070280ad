//! Append-only tombstone archive.

use rusqlite::{params, Connection};

use vault_core::errors::VaultResult;
use vault_core::models::Tombstone;

use crate::{corrupt, to_storage_err};

pub fn insert_tombstone(conn: &Connection, tombstone: &Tombstone) -> VaultResult<()> {
    let body = serde_json::to_string(tombstone)?;
    conn.execute(
        "INSERT INTO tombstones (scar_id, vault_id, cycle, reason, stitched_into, body, removed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tombstone.scar_id,
            tombstone.vault_id.as_str(),
            tombstone.cycle as i64,
            tombstone.reason,
            tombstone.scar.stitched_into,
            body,
            tombstone.removed_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All tombstones in write order.
pub fn all_tombstones(conn: &Connection) -> VaultResult<Vec<Tombstone>> {
    let mut stmt = conn
        .prepare("SELECT id, body FROM tombstones ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, body) = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(serde_json::from_str(&body).map_err(|e| corrupt(format!("tombstone {id}"), e))?);
    }
    Ok(out)
}

/// Ids of scars that were compacted into `latent_id`.
pub fn stitched_sources(conn: &Connection, latent_id: &str) -> VaultResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT scar_id FROM tombstones WHERE stitched_into = ?1 ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![latent_id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
