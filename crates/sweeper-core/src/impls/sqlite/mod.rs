//! SqliteStore - リレーショナル DB 上の正本
//!
//! # Responsibility
//! - Implement `FileStore`, `TaskStore` and `NotificationStore` over one
//!   SQLite connection shared with nothing else in the process.
//! - Keep SQL details inside this module.
//!
//! # Invariants
//! - Connections have `foreign_keys=ON` and migrations fully applied.
//! - Every write unit is one transaction; a failure anywhere in it rolls the
//!   whole unit back (the `Transaction` is dropped without commit).
//! - Statements run on the blocking pool, never on the async executor.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::domain::{
    BoardId, DueTask, FileId, NewNotification, NewStoredFile, StoredFile, SweepError, SweepResult,
    TaskId, UserId,
};
use crate::ports::{FileStore, NotificationStore, TaskStore};

pub mod migrations;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl From<DbError> for SweepError {
    fn from(value: DbError) -> Self {
        SweepError::Store(value.to_string())
    }
}

const FILE_SELECT_SQL: &str = "SELECT
    id,
    file_path,
    original_filename,
    file_size,
    retention_days,
    expires_at,
    card_id,
    uploaded_at
FROM files";

const TASK_SELECT_SQL: &str = "SELECT
    c.id,
    col.board_id,
    c.title,
    c.due_at,
    c.completed,
    c.completed_at,
    b.owner_id
FROM cards c
JOIN board_columns col ON col.id = c.column_id
LEFT JOIN boards b ON b.id = col.board_id";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self::bootstrap(conn)?;
        info!(path = %path.display(), "database opened");
        Ok(store)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(mut conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let applied = migrations::migrate(&mut conn)?;
        debug!(
            applied,
            schema_version = migrations::target_version(),
            "schema up to date"
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the calling thread.
    ///
    /// Meant for setup code and tests; the port implementations below go
    /// through the blocking pool instead.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> SweepResult<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| SweepError::Store("connection mutex poisoned".to_string()))?;
        f(&mut conn).map_err(|err| SweepError::Store(err.to_string()))
    }

    /// Persist an upload's metadata. The expiry is derived from the retention
    /// period here so a row with `retention_days` always carries `expires_at`.
    pub async fn record_upload(
        &self,
        upload: NewStoredFile,
        uploaded_at: DateTime<Utc>,
    ) -> SweepResult<FileId> {
        let expires_at = upload.expires_at(uploaded_at);
        let size = i64::try_from(upload.size_bytes)
            .map_err(|_| SweepError::Store(format!("file size {} out of range", upload.size_bytes)))?;
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO files (
                    file_path,
                    original_filename,
                    file_size,
                    retention_days,
                    expires_at,
                    card_id,
                    uploaded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    upload.path,
                    upload.original_name,
                    size,
                    upload.retention_days,
                    expires_at.map(|at| at.timestamp_millis()),
                    upload.task_id.map(|id| id.get()),
                    uploaded_at.timestamp_millis(),
                ],
            )
            .map_err(store_err)?;
            Ok(FileId::new(conn.last_insert_rowid()))
        })
        .await
    }

    pub async fn get_file(&self, id: FileId) -> SweepResult<Option<StoredFile>> {
        self.blocking(move |conn| {
            conn.query_row(
                &format!("{FILE_SELECT_SQL} WHERE id = ?1"),
                params![id.get()],
                map_file,
            )
            .optional()
            .map_err(store_err)
        })
        .await
    }

    async fn blocking<T, F>(&self, f: F) -> SweepResult<T>
    where
        F: FnOnce(&mut Connection) -> SweepResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| SweepError::Store("connection mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| SweepError::Store(format!("blocking task failed: {e}")))?
    }
}

fn store_err(err: rusqlite::Error) -> SweepError {
    SweepError::Store(err.to_string())
}

fn commit_err(err: rusqlite::Error) -> SweepError {
    SweepError::Commit(err.to_string())
}

fn timestamp(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(idx)?
        .map(|millis| timestamp(idx, millis))
        .transpose()
}

fn map_file(row: &Row<'_>) -> rusqlite::Result<StoredFile> {
    let size: i64 = row.get(3)?;
    Ok(StoredFile {
        id: FileId::new(row.get(0)?),
        path: row.get(1)?,
        original_name: row.get(2)?,
        size_bytes: u64::try_from(size).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, size))?,
        retention_days: row.get(4)?,
        expires_at: optional_timestamp(row, 5)?,
        task_id: row.get::<_, Option<i64>>(6)?.map(TaskId::new),
        uploaded_at: timestamp(7, row.get(7)?)?,
    })
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<DueTask> {
    Ok(DueTask {
        id: TaskId::new(row.get(0)?),
        board_id: BoardId::new(row.get(1)?),
        title: row.get(2)?,
        due_at: optional_timestamp(row, 3)?,
        completed: row.get(4)?,
        completed_at: optional_timestamp(row, 5)?,
        assignees: Vec::new(),
        board_owner: row.get::<_, Option<i64>>(6)?.map(UserId::new),
    })
}

/// Load tasks matching `filter` (a WHERE fragment) and attach their assignees.
fn load_tasks(
    conn: &Connection,
    filter: &str,
    bounds: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<DueTask>> {
    let sql = format!(
        "{TASK_SELECT_SQL} WHERE c.completed = 0 AND c.due_at IS NOT NULL AND {filter} ORDER BY c.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut tasks = stmt
        .query_map(bounds, map_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut assignees =
        conn.prepare_cached("SELECT user_id FROM card_assignees WHERE card_id = ?1 ORDER BY user_id")?;
    for task in &mut tasks {
        task.assignees = assignees
            .query_map(params![task.id.get()], |row| row.get::<_, i64>(0).map(UserId::new))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
    }
    Ok(tasks)
}

#[async_trait]
impl FileStore for SqliteStore {
    async fn expired_files(&self, now: DateTime<Utc>) -> SweepResult<Vec<StoredFile>> {
        self.blocking(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{FILE_SELECT_SQL} WHERE expires_at IS NOT NULL AND expires_at <= ?1 ORDER BY id"
                ))
                .map_err(store_err)?;
            let files = stmt
                .query_map(params![now.timestamp_millis()], map_file)
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                .map_err(store_err)?;
            Ok(files)
        })
        .await
    }

    async fn delete_files(&self, ids: &[FileId]) -> SweepResult<usize> {
        let ids = ids.to_vec();
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(commit_err)?;
            let mut removed = 0;
            {
                let mut stmt = tx
                    .prepare_cached("DELETE FROM files WHERE id = ?1")
                    .map_err(commit_err)?;
                for id in &ids {
                    removed += stmt.execute(params![id.get()]).map_err(commit_err)?;
                }
            }
            tx.commit().map_err(commit_err)?;
            Ok(removed)
        })
        .await
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn open_tasks_due_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> SweepResult<Vec<DueTask>> {
        let (after, until) = (after.timestamp_millis(), until.timestamp_millis());
        self.blocking(move |conn| {
            load_tasks(conn, "c.due_at > ?1 AND c.due_at <= ?2", &[&after, &until]).map_err(store_err)
        })
        .await
    }

    async fn open_tasks_due_before(&self, before: DateTime<Utc>) -> SweepResult<Vec<DueTask>> {
        let before = before.timestamp_millis();
        self.blocking(move |conn| load_tasks(conn, "c.due_at < ?1", &[&before]).map_err(store_err))
            .await
    }
}

#[async_trait]
impl NotificationStore for SqliteStore {
    async fn insert_notifications(&self, batch: &[NewNotification]) -> SweepResult<usize> {
        let batch = batch.to_vec();
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(commit_err)?;
            {
                let mut stmt = tx
                    .prepare_cached(
                        "INSERT INTO notifications (
                            user_id,
                            type,
                            title,
                            message,
                            card_id,
                            link,
                            is_read,
                            created_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                    )
                    .map_err(commit_err)?;
                for n in &batch {
                    stmt.execute(params![
                        n.user_id.get(),
                        n.kind.as_str(),
                        n.title,
                        n.message,
                        n.task_id.map(|id| id.get()),
                        n.link,
                        n.created_at.timestamp_millis(),
                    ])
                    .map_err(commit_err)?;
                }
            }
            tx.commit().map_err(commit_err)?;
            Ok(batch.len())
        })
        .await
    }
}
