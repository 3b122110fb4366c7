//! SQLite-backed task store.
//!
//! One table, `tasks`, owned by a single [`rusqlite::Connection`] behind
//! a [`parking_lot::Mutex`] (the connection is `Send` but not `Sync`).
//! All reads and writes go through this type; the application crate
//! wraps it in a background worker so the UI thread never touches the
//! database directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rusqlite::{Connection, params};
use thiserror::Error;
use tracing::{debug, info};

use crate::filter::TaskFilter;
use crate::task::{DEMO_TASKS, MAX_TASK_NAME_LENGTH, Task, TaskId};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Task name cannot be empty.
    #[error("task name cannot be empty")]
    NameEmpty,
    /// Task name exceeds the maximum length.
    #[error("task name too long (max {MAX_TASK_NAME_LENGTH} characters)")]
    NameTooLong,
    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Filesystem failure while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

const CREATE_TABLES: &str = "\
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    important INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0,
    created_ms INTEGER NOT NULL
);";

const SELECT_COLUMNS: &str = "id, name, important, completed, created_ms";

/// Handle to the local task table.
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct TaskStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl TaskStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the parent directory cannot be
    /// created, or [`StoreError::Database`] if SQLite setup fails.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        info!(path = %path.display(), "task store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_owned(),
        })
    }

    /// Opens an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if SQLite setup fails.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    fn init(conn: &Connection) -> Result<(), StoreError> {
        // journal_mode returns the resulting mode as a row.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(())
    }

    /// Where this store lives on disk (`:memory:` for test stores).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates a new task with a fresh id and the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NameEmpty`] or [`StoreError::NameTooLong`]
    /// if the name fails validation, or [`StoreError::Database`] on
    /// SQLite failure.
    pub fn create(&self, name: &str, important: bool) -> Result<Task, StoreError> {
        validate_name(name)?;
        let created_ms = now_ms();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tasks (name, important, completed, created_ms) VALUES (?1, ?2, 0, ?3)",
            params![name, important, created_ms],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Task {
            id: TaskId::from_i64(id),
            name: name.to_string(),
            important,
            completed: false,
            created_ms,
        })
    }

    /// Upserts a task by id: if a row with the same id exists, all of its
    /// fields (including the creation timestamp) are replaced. This is
    /// the undo path: re-inserting a deleted task restores it verbatim.
    ///
    /// # Errors
    ///
    /// Returns a name validation error or [`StoreError::Database`].
    pub fn insert(&self, task: &Task) -> Result<(), StoreError> {
        validate_name(&task.name)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO tasks (id, name, important, completed, created_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.id.as_i64(),
                task.name,
                task.important,
                task.completed,
                task.created_ms
            ],
        )?;
        Ok(())
    }

    /// Updates name/important/completed of the row matching `task.id`.
    /// The creation timestamp is never touched. Returns the number of
    /// affected rows (0 if the id is absent).
    ///
    /// # Errors
    ///
    /// Returns a name validation error or [`StoreError::Database`].
    pub fn update(&self, task: &Task) -> Result<usize, StoreError> {
        validate_name(&task.name)?;
        let conn = self.conn.lock();
        let affected = conn.execute(
            "UPDATE tasks SET name = ?2, important = ?3, completed = ?4 WHERE id = ?1",
            params![
                task.id.as_i64(),
                task.name,
                task.important,
                task.completed
            ],
        )?;
        Ok(affected)
    }

    /// Deletes the row matching `task.id`. Returns the number of
    /// affected rows (0 if the id is absent).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub fn delete(&self, task: &Task) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "DELETE FROM tasks WHERE id = ?1",
            params![task.id.as_i64()],
        )?;
        Ok(affected)
    }

    /// Runs the filtered, ordered list query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub fn query(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM tasks \
             WHERE name LIKE ?1 ESCAPE '\\' AND (completed = 0 OR ?2 = 0) \
             ORDER BY {}",
            filter.order_clause()
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![filter.like_pattern(), filter.hide_completed],
            row_to_task,
        )?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Looks up a single task by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub fn find(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM tasks WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id.as_i64()], row_to_task)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Total number of rows in the table, ignoring any filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Inserts the demo rows. Creation timestamps are staggered so the
    /// by-date ordering of the seed data is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub fn seed_demo(&self) -> Result<(), StoreError> {
        let base = now_ms();
        let conn = self.conn.lock();
        for (i, (name, important, completed)) in DEMO_TASKS.iter().enumerate() {
            conn.execute(
                "INSERT INTO tasks (name, important, completed, created_ms) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, important, completed, base + i as u64],
            )?;
        }
        debug!(rows = DEMO_TASKS.len(), "seeded demo tasks");
        Ok(())
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: TaskId::from_i64(row.get(0)?),
        name: row.get(1)?,
        important: row.get(2)?,
        completed: row.get(3)?,
        created_ms: row.get(4)?,
    })
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::NameEmpty);
    }
    if name.chars().count() > MAX_TASK_NAME_LENGTH {
        return Err(StoreError::NameTooLong);
    }
    Ok(())
}

/// Current time in milliseconds since epoch.
fn now_ms() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}
