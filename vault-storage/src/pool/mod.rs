//! The single write connection. Reads share it; vault snapshots are small
//! enough that a read pool is not worth the second code path.

pub mod pragmas;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use vault_core::errors::{VaultError, VaultResult};

use crate::to_storage_err;
use pragmas::apply_pragmas;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> VaultResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> VaultResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Acquire the connection and run `f` with it.
    pub fn with_conn_sync<F, T>(&self, f: F) -> VaultResult<T>
    where
        F: FnOnce(&Connection) -> VaultResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| VaultError::poisoned("sqlite connection"))?;
        f(&guard)
    }
}
