//! Remote index stored in an updatedb-style SQLite database.
//!
//! Entries live in a single `data` table: one row per remote file or
//! directory, linked to its parent by `parent_id`. Top-level entries have
//! `parent_id = 0`.

use super::{ChildEntry, EntryId, RemoteIndex};
use crate::db::connection::{create_index_pool, DbPool};
use crate::utils::{Result, StrmError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS data (
  id INTEGER PRIMARY KEY,
  parent_id INTEGER NOT NULL DEFAULT 0,
  pickcode TEXT NOT NULL DEFAULT '',
  name TEXT NOT NULL,
  is_dir INTEGER NOT NULL DEFAULT 0,
  is_alive INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_data_parent_id ON data(parent_id);
"#;

const POOL_SIZE: u32 = 2;

#[derive(Debug)]
struct IndexRow {
    parent_id: i64,
    name: String,
}

pub struct SqliteIndex {
    pool: DbPool,
}

impl SqliteIndex {
    /// Open an existing index database.
    pub fn open(path: &Path) -> Result<Self> {
        let pool = create_index_pool(path, POOL_SIZE)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the `data` table. Used by index builders and fixtures; the
    /// generator itself never writes to the index.
    pub fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn row(&self, id: EntryId) -> Result<Option<IndexRow>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT parent_id, name FROM data WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(IndexRow {
                        parent_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

impl RemoteIndex for SqliteIndex {
    fn contains(&self, id: EntryId) -> Result<bool> {
        if id.is_root() {
            return Ok(true);
        }
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare_cached("SELECT 1 FROM data WHERE id = ?1 AND is_alive")?;
        Ok(stmt.exists(params![id.0])?)
    }

    fn list_children(&self, parent: EntryId) -> Result<Vec<ChildEntry>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, is_dir FROM data WHERE parent_id = ?1 AND is_alive ORDER BY id",
        )?;
        let rows = stmt.query_map(params![parent.0], |row| {
            Ok(ChildEntry {
                id: EntryId(row.get(0)?),
                is_dir: row.get::<_, i64>(1)? != 0,
            })
        })?;

        let mut children = Vec::new();
        for r in rows {
            children.push(r?);
        }
        Ok(children)
    }

    fn resolve_path(&self, id: EntryId) -> Result<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = id;

        while !current.is_root() {
            if !seen.insert(current) {
                return Err(StrmError::CorruptIndex(format!(
                    "parent cycle through entry {current}"
                )));
            }
            let row = self.row(current)?.ok_or(StrmError::NotFound(current))?;
            names.push(row.name);
            current = EntryId(row.parent_id);
        }

        Ok(names.iter().rev().fold(String::new(), |mut path, name| {
            path.push('/');
            path.push_str(name);
            path
        }))
    }

    fn resolve_content_handle(&self, id: EntryId) -> Result<String> {
        let conn = self.pool.get()?;
        let pickcode: Option<String> = conn
            .query_row(
                "SELECT pickcode FROM data WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;

        match pickcode {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(StrmError::NotFound(id)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Rows are `(id, parent_id, name, is_dir, pickcode)`.
    pub(crate) fn build_index(
        dir: &TempDir,
        rows: &[(i64, i64, &str, bool, &str)],
    ) -> Result<SqliteIndex> {
        let path = dir.path().join("index.sqlite");
        let conn = Connection::open(&path)?;
        SqliteIndex::init_schema(&conn)?;
        for (id, parent_id, name, is_dir, pickcode) in rows {
            conn.execute(
                "INSERT INTO data (id, parent_id, pickcode, name, is_dir) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, parent_id, pickcode, name, *is_dir as i64],
            )?;
        }
        drop(conn);
        SqliteIndex::open(&path)
    }

    fn sample(dir: &TempDir) -> Result<SqliteIndex> {
        build_index(
            dir,
            &[
                (1, 0, "Movies", true, ""),
                (2, 1, "Inception.mkv", false, "xyz"),
                (3, 1, "notes.txt", false, "n0t"),
                (4, 1, "Sci-Fi", true, ""),
                (5, 4, "Dune.mp4", false, "dun"),
            ],
        )
    }

    #[test]
    fn test_resolve_path() -> Result<()> {
        let dir = TempDir::new()?;
        let index = sample(&dir)?;

        assert_eq!(index.resolve_path(EntryId::ROOT)?, "");
        assert_eq!(index.resolve_path(EntryId(1))?, "/Movies");
        assert_eq!(index.resolve_path(EntryId(5))?, "/Movies/Sci-Fi/Dune.mp4");
        Ok(())
    }

    #[test]
    fn test_list_children_in_id_order() -> Result<()> {
        let dir = TempDir::new()?;
        let index = sample(&dir)?;

        let children = index.list_children(EntryId(1))?;
        let ids: Vec<i64> = children.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(children[2].is_dir);
        assert!(!children[0].is_dir);
        Ok(())
    }

    #[test]
    fn test_dead_entries_are_not_listed() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("index.sqlite");
        let conn = Connection::open(&path)?;
        SqliteIndex::init_schema(&conn)?;
        conn.execute_batch(
            "INSERT INTO data (id, parent_id, name, is_dir, is_alive) VALUES (1, 0, 'gone.mkv', 0, 0);
             INSERT INTO data (id, parent_id, name, is_dir, is_alive) VALUES (2, 0, 'here.mkv', 0, 1);",
        )?;
        drop(conn);

        let index = SqliteIndex::open(&path)?;
        let children = index.list_children(EntryId::ROOT)?;
        assert_eq!(children, vec![ChildEntry { id: EntryId(2), is_dir: false }]);
        Ok(())
    }

    #[test]
    fn test_dead_folder_is_not_contained() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("index.sqlite");
        let conn = Connection::open(&path)?;
        SqliteIndex::init_schema(&conn)?;
        conn.execute_batch(
            "INSERT INTO data (id, parent_id, name, is_dir, is_alive) VALUES (1, 0, 'Old', 1, 0);
             INSERT INTO data (id, parent_id, name, is_dir, pickcode) VALUES (2, 1, 'a.mkv', 0, 'a');",
        )?;
        drop(conn);

        let index = SqliteIndex::open(&path)?;
        assert!(!index.contains(EntryId(1))?);
        assert!(index.contains(EntryId(2))?);

        let walked = crate::fs::enumerate_files(&index, EntryId(1), &tracing::Span::none());
        assert!(matches!(walked, Err(StrmError::NotFound(EntryId(1)))));
        Ok(())
    }

    #[test]
    fn test_missing_entry_is_not_found() -> Result<()> {
        let dir = TempDir::new()?;
        let index = sample(&dir)?;

        assert!(!index.contains(EntryId(99))?);
        assert!(index.contains(EntryId::ROOT)?);
        assert!(matches!(
            index.resolve_path(EntryId(99)),
            Err(StrmError::NotFound(EntryId(99)))
        ));
        assert!(matches!(
            index.resolve_content_handle(EntryId(99)),
            Err(StrmError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_resolve_content_handle() -> Result<()> {
        let dir = TempDir::new()?;
        let index = sample(&dir)?;
        assert_eq!(index.resolve_content_handle(EntryId(2))?, "xyz");
        Ok(())
    }

    #[test]
    fn test_parent_cycle_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        let index = build_index(
            &dir,
            &[(1, 2, "a", true, ""), (2, 1, "b", true, "")],
        )?;
        assert!(matches!(
            index.resolve_path(EntryId(1)),
            Err(StrmError::CorruptIndex(_))
        ));
        Ok(())
    }

    #[test]
    fn test_open_missing_database() {
        let result = SqliteIndex::open(Path::new("/nonexistent_dir_12345/index.sqlite"));
        assert!(matches!(result, Err(StrmError::Config(_))));
    }
}
