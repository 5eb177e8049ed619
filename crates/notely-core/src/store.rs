use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{GroupFilter, Note, NoteId, NoteQuery, OwnerId, StatusFilter, StoreError};

pub const DB_FILE: &str = "notes.db";

const NOTE_COLUMNS: &str = "id, author_id, content, completed, note_group, created_at_ms";

/// Notes table on a single SQLite connection.
///
/// Every single-note write is one statement and applies atomically. Group
/// renames run inside one transaction.
#[derive(Debug)]
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir)?;
        let path = storage_dir.join(DB_FILE);
        let conn = Connection::open(&path)?;
        let store = Self {
            path: Some(path),
            conn,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            path: None,
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS meta (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              author_id TEXT NOT NULL,
              content TEXT NOT NULL,
              completed INTEGER,
              note_group TEXT,
              created_at_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS by_author ON notes(author_id, created_at_ms);
            CREATE INDEX IF NOT EXISTS by_author_and_group ON notes(author_id, note_group, created_at_ms);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
            params!["schema_version", "v1"],
        )?;
        Ok(())
    }

    pub fn insert(
        &mut self,
        author: &OwnerId,
        content: &str,
        group: Option<&str>,
        created_at_ms: i64,
    ) -> Result<NoteId, StoreError> {
        self.conn.execute(
            "INSERT INTO notes(author_id, content, completed, note_group, created_at_ms) \
             VALUES (?1, ?2, 0, ?3, ?4)",
            params![author.as_str(), content, group, created_at_ms],
        )?;
        Ok(NoteId(self.conn.last_insert_rowid()))
    }

    pub fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                params![id.0],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    /// Overwrite content; `group: None` keeps the stored group, `Some(None)` clears it.
    pub fn update_content(
        &mut self,
        id: NoteId,
        content: &str,
        group: Option<Option<&str>>,
    ) -> Result<(), StoreError> {
        match group {
            Some(group) => self.conn.execute(
                "UPDATE notes SET content = ?2, note_group = ?3 WHERE id = ?1",
                params![id.0, content, group],
            )?,
            None => self.conn.execute(
                "UPDATE notes SET content = ?2 WHERE id = ?1",
                params![id.0, content],
            )?,
        };
        Ok(())
    }

    pub fn set_completed(&mut self, id: NoteId, completed: bool) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE notes SET completed = ?2 WHERE id = ?1",
            params![id.0, completed],
        )?;
        Ok(())
    }

    pub fn delete(&mut self, id: NoteId) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id.0])?;
        Ok(changed > 0)
    }

    /// Notes owned by `author` matching `query`, newest first.
    pub fn query(&self, author: &OwnerId, query: &NoteQuery) -> Result<Vec<Note>, StoreError> {
        let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE author_id = ?1");
        let mut args = vec![Value::Text(author.as_str().to_string())];

        match &query.group {
            GroupFilter::Any => {}
            GroupFilter::Ungrouped => {
                sql.push_str(" AND (note_group IS NULL OR note_group = '')");
            }
            GroupFilter::Named(name) => {
                args.push(Value::Text(name.clone()));
                sql.push_str(&format!(" AND note_group = ?{}", args.len()));
            }
        }

        match query.status {
            StatusFilter::All => {}
            StatusFilter::Completed => sql.push_str(" AND completed = 1"),
            StatusFilter::Incomplete => {
                sql.push_str(" AND (completed IS NULL OR completed = 0)");
            }
        }

        sql.push_str(" ORDER BY created_at_ms DESC, id DESC");
        debug!(%sql, "notes query");

        let mut stmt = self.conn.prepare(&sql)?;
        let notes = stmt
            .query_map(params_from_iter(args.iter()), note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Distinct non-blank group labels of `author`, sorted.
    pub fn distinct_groups(&self, author: &OwnerId) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT note_group FROM notes \
             WHERE author_id = ?1 AND note_group IS NOT NULL",
        )?;
        let groups = stmt
            .query_map(params![author.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let groups: BTreeSet<String> = groups
            .into_iter()
            .filter(|g| !g.trim().is_empty())
            .collect();
        Ok(groups.into_iter().collect())
    }

    /// Relabel every note of `author` in group `from` (exact match) to `to`.
    ///
    /// All rows change in one transaction: either every matching note is
    /// relabelled or none is.
    pub fn rename_group(
        &mut self,
        author: &OwnerId,
        from: &str,
        to: &str,
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let ids = {
            let mut stmt =
                tx.prepare("SELECT id FROM notes WHERE author_id = ?1 AND note_group = ?2 ORDER BY id")?;
            let ids = stmt
                .query_map(params![author.as_str(), from], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };
        for id in &ids {
            tx.execute(
                "UPDATE notes SET note_group = ?2 WHERE id = ?1",
                params![id, to],
            )?;
        }
        tx.commit()?;
        Ok(ids.len())
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: NoteId(row.get(0)?),
        author_id: OwnerId::from_stored(row.get(1)?),
        content: row.get(2)?,
        completed: row.get::<_, Option<bool>>(3)?.unwrap_or(false),
        group: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}
