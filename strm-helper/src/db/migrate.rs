use crate::utils::Result;
use rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS strm_files (
  file_path TEXT,
  content TEXT
);
"#;

const UNIQUE_INDEX: &str = "idx_strm_files_file_path";

/// Bring a ledger database up to the current schema.
///
/// Ledgers written before the unique index existed may hold duplicate rows;
/// those collapse to the first-inserted record before the index is created.
pub fn migrate_ledger(conn: &Connection) -> Result<()> {
    tracing::debug!("[DB] Migrating pointer ledger schema");

    conn.execute_batch(SCHEMA)?;

    if !has_index(conn, UNIQUE_INDEX)? {
        let removed = conn.execute(
            "DELETE FROM strm_files
             WHERE rowid NOT IN (SELECT MIN(rowid) FROM strm_files GROUP BY file_path)",
            [],
        )?;
        if removed > 0 {
            tracing::warn!(removed, "[DB] Dropped duplicate ledger records");
        }
        conn.execute_batch(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {UNIQUE_INDEX} ON strm_files(file_path)"
        ))?;
        tracing::info!("[DB] Created unique index on strm_files.file_path");
    }

    Ok(())
}

fn has_index(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1")?;
    Ok(stmt.exists([name])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        migrate_ledger(&conn)?;
        migrate_ledger(&conn)?;
        assert!(has_index(&conn, UNIQUE_INDEX)?);
        Ok(())
    }

    #[test]
    fn test_migrate_collapses_legacy_duplicates() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE strm_files (file_path TEXT, content TEXT);
             INSERT INTO strm_files VALUES ('/m/a.strm', 'first');
             INSERT INTO strm_files VALUES ('/m/a.strm', 'second');
             INSERT INTO strm_files VALUES ('/m/b.strm', 'only');",
        )?;

        migrate_ledger(&conn)?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM strm_files", [], |r| r.get(0))?;
        assert_eq!(count, 2);
        let content: String = conn.query_row(
            "SELECT content FROM strm_files WHERE file_path = '/m/a.strm'",
            [],
            |r| r.get(0),
        )?;
        assert_eq!(content, "first");

        let dup = conn.execute("INSERT INTO strm_files VALUES ('/m/b.strm', 'again')", []);
        assert!(dup.is_err());
        Ok(())
    }
}
