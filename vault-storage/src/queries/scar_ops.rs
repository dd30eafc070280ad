//! Scar rows: the full scar as JSON plus the columns the range queries use.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use vault_core::errors::VaultResult;
use vault_core::{Scar, VaultId};

use crate::{corrupt, to_storage_err};

pub fn insert_scar(conn: &Connection, scar: &Scar) -> VaultResult<()> {
    let body = serde_json::to_string(scar)?;
    conn.execute(
        "INSERT INTO scars (scar_id, vault_id, cls_angle, created_at_us, post_entropy, active, body)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            scar.scar_id,
            scar.current_vault.as_str(),
            scar.cls_angle,
            scar.created_at.timestamp_micros(),
            scar.post_entropy,
            scar.is_active() as i32,
            body,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn delete_vault_scars(conn: &Connection, vault: VaultId) -> VaultResult<usize> {
    conn.execute("DELETE FROM scars WHERE vault_id = ?1", params![vault.as_str()])
        .map_err(|e| to_storage_err(e.to_string()))
}

fn query_scars(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> VaultResult<Vec<Scar>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(args, |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scars = Vec::new();
    for row in rows {
        let (scar_id, body) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let scar: Scar = serde_json::from_str(&body).map_err(|e| corrupt(format!("scar {scar_id}"), e))?;
        scars.push(scar);
    }
    Ok(scars)
}

pub fn vault_scars(conn: &Connection, vault: VaultId) -> VaultResult<Vec<Scar>> {
    query_scars(
        conn,
        "SELECT scar_id, body FROM scars WHERE vault_id = ?1 ORDER BY created_at_us, scar_id",
        params![vault.as_str()],
    )
}

pub fn get_scar(conn: &Connection, scar_id: &str) -> VaultResult<Option<Scar>> {
    Ok(query_scars(conn, "SELECT scar_id, body FROM scars WHERE scar_id = ?1", params![scar_id])?
        .into_iter()
        .next())
}

/// Scars with `lo <= cls_angle <= hi`, ordered by angle.
pub fn angle_range(conn: &Connection, vault: VaultId, lo: f64, hi: f64) -> VaultResult<Vec<Scar>> {
    query_scars(
        conn,
        "SELECT scar_id, body FROM scars
         WHERE vault_id = ?1 AND cls_angle >= ?2 AND cls_angle <= ?3
         ORDER BY cls_angle, scar_id",
        params![vault.as_str(), lo, hi],
    )
}

/// Scars created within `[from, to]`, ordered by creation time.
pub fn created_range(
    conn: &Connection,
    vault: VaultId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> VaultResult<Vec<Scar>> {
    query_scars(
        conn,
        "SELECT scar_id, body FROM scars
         WHERE vault_id = ?1 AND created_at_us >= ?2 AND created_at_us <= ?3
         ORDER BY created_at_us, scar_id",
        params![vault.as_str(), from.timestamp_micros(), to.timestamp_micros()],
    )
}

pub fn count_scars(conn: &Connection, vault: VaultId) -> VaultResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM scars WHERE vault_id = ?1", params![vault.as_str()], |row| {
            row.get(0)
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}
