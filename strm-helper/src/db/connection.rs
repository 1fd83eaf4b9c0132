use crate::utils::{Result, StrmError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Open a small read-only pool over an existing remote index database.
///
/// The file must already exist; it is owned by the index builder.
pub fn create_index_pool(db_path: &Path, max_size: u32) -> Result<DbPool> {
    if !db_path.is_file() {
        return Err(StrmError::Config(format!(
            "remote index not found: {}",
            db_path.display()
        )));
    }

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .with_init(|conn| conn.execute_batch("PRAGMA query_only = ON;"));

    let pool = Pool::builder().max_size(max_size.max(1)).build(manager)?;
    Ok(pool)
}

/// Open the connection that backs a pointer ledger, creating the file if needed.
pub fn open_ledger_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        "PRAGMA journal_mode = DELETE;
         PRAGMA synchronous = FULL;",
    )?;

    Ok(conn)
}
