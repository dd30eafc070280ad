use rusqlite::{params, Connection, OptionalExtension};

use vault_core::errors::VaultResult;
use vault_core::{VaultId, VaultMetadata};

use crate::{corrupt, to_storage_err};

pub fn upsert_metadata(conn: &Connection, metadata: &VaultMetadata) -> VaultResult<()> {
    let body = serde_json::to_string(metadata)?;
    conn.execute(
        "INSERT INTO vault_metadata (vault_id, body) VALUES (?1, ?2)
         ON CONFLICT(vault_id) DO UPDATE SET
            body = excluded.body,
            saved_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![metadata.vault_id.as_str(), body],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_metadata(conn: &Connection, vault: VaultId) -> VaultResult<Option<VaultMetadata>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM vault_metadata WHERE vault_id = ?1",
            params![vault.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    body.map(|b| serde_json::from_str(&b).map_err(|e| corrupt(format!("vault_metadata {vault}"), e)))
        .transpose()
}
