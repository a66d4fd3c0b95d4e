//! SQLite-backed history store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use super::schema::apply_schema;
use super::{HistoryError, HistoryRecord, HistoryStore};

/// Persistent history table.
///
/// Appends are serialized through an internal `Mutex<Connection>`.
pub struct SqliteHistoryStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHistoryStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT command, response, timestamp, success FROM command_history
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_record)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM command_history", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, HistoryError> {
        self.conn
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO command_history (command, response, timestamp, success)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.command,
                record.response,
                record.timestamp.to_rfc3339(),
                record.success
            ],
        )?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let timestamp: String = row.get(2)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(HistoryRecord {
        command: row.get(0)?,
        response: row.get(1)?,
        timestamp,
        success: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn append_and_read_back_newest_first() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        store.append(&HistoryRecord::now("open notepad", "✅ Opened notepad", true)).unwrap();
        store.append(&HistoryRecord::now("wifi passwords", "❌ nope", false)).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        let recent = store.recent(10).unwrap();
        assert_eq!(recent[0].command, "wifi passwords");
        assert!(!recent[0].success);
        assert_eq!(recent[1].response, "✅ Opened notepad");
        assert_eq!(store.recent(1).unwrap().len(), 1);
    }

    #[test]
    fn timestamps_survive_storage() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        let record = HistoryRecord::now("what time is it", "noon", true);
        store.append(&record).unwrap();
        let back = &store.recent(1).unwrap()[0];
        assert_eq!(back.timestamp.timestamp_micros(), record.timestamp.timestamp_micros());
    }

    #[test]
    fn open_creates_parent_dirs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        {
            let store = SqliteHistoryStore::open(&path).unwrap();
            store.append(&HistoryRecord::now("a", "b", true)).unwrap();
        }
        let reopened = SqliteHistoryStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let store = std::sync::Arc::new(SqliteHistoryStore::in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..5 {
                        store
                            .append(&HistoryRecord::now(format!("cmd {i}-{j}"), "ok", true))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count().unwrap(), 40);
    }
}
