use super::{LedgerRecord, PointerLedger};
use crate::db::connection::open_ledger_connection;
use crate::db::migrate::migrate_ledger;
use crate::utils::{Result, StrmError};
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;

/// Ledger stored in the `strm_files` table of a SQLite database.
///
/// In batch mode every insert joins one transaction that `close` commits;
/// dropping the ledger without closing discards the uncommitted records.
pub struct SqliteLedger {
    conn: Connection,
    batch: bool,
}

impl SqliteLedger {
    /// Open with autocommit: each insert is durable on return.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_ledger_connection(path)?;
        migrate_ledger(&conn)?;
        Ok(Self { conn, batch: false })
    }

    /// Open with a single transaction spanning the whole run.
    pub fn open_batch(path: &Path) -> Result<Self> {
        let conn = open_ledger_connection(path)?;
        migrate_ledger(&conn)?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self { conn, batch: true })
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM strm_files", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn records(&self) -> Result<Vec<LedgerRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_path, content FROM strm_files ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(LedgerRecord {
                pointer_path: row.get(0)?,
                content: row.get(1)?,
            })
        })?;

        let mut records = Vec::new();
        for r in rows {
            records.push(r?);
        }
        Ok(records)
    }
}

impl PointerLedger for SqliteLedger {
    fn exists(&self, pointer_path: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM strm_files WHERE file_path = ?1")?;
        Ok(stmt.exists(params![pointer_path])?)
    }

    fn insert(&mut self, pointer_path: &str, content: &str) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO strm_files (file_path, content) VALUES (?1, ?2)",
            params![pointer_path, content],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StrmError::DuplicateRecord(pointer_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close(self) -> Result<()> {
        if self.batch {
            self.conn.execute_batch("COMMIT")?;
        }
        self.conn.close().map_err(|(_, e)| StrmError::Database(e))
    }
}
