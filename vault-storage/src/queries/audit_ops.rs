//! Durable audit log.

use rusqlite::{params, Connection};

use vault_core::errors::VaultResult;
use vault_core::models::AuditRecord;
use vault_core::VaultId;

use crate::{corrupt, to_storage_err};

pub fn insert_record(conn: &Connection, record: &AuditRecord) -> VaultResult<()> {
    let body = serde_json::to_string(record)?;
    conn.execute(
        "INSERT INTO audit_log (vault_id, operation, cycle, body, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.vault_id.as_str(),
            record.operation.as_str(),
            record.cycle as i64,
            body,
            record.timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Records for `vault`, oldest first.
pub fn records_for_vault(conn: &Connection, vault: VaultId) -> VaultResult<Vec<AuditRecord>> {
    let mut stmt = conn
        .prepare("SELECT id, body FROM audit_log WHERE vault_id = ?1 ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![vault.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, body) = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(serde_json::from_str(&body).map_err(|e| corrupt(format!("audit {id}"), e))?);
    }
    Ok(out)
}

pub fn count_by_operation(conn: &Connection, operation: &str) -> VaultResult<usize> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM audit_log WHERE operation = ?1",
            params![operation],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}
