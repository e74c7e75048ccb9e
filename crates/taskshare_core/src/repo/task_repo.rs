//! Task ownership oracle contract and SQLite implementation.
//!
//! # Responsibility
//! - Answer ownership and existence questions for the sharing core.
//! - Provide the minimal task create/delete surface the oracle needs.
//!
//! # Invariants
//! - Deleting a task removes its grants through `ON DELETE CASCADE`.

use crate::model::access::now_epoch_ms;
use crate::model::task::{TaskId, TaskRecord};
use crate::model::user::UserId;
use crate::repo::{constraint_code, parse_uuid, RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Read-only view of task ownership.
pub trait TaskOwnershipOracle {
    fn is_owner(&self, task_id: TaskId, user_id: UserId) -> RepoResult<bool>;
    fn task_exists(&self, task_id: TaskId) -> RepoResult<bool>;
    fn get_task(&self, task_id: TaskId) -> RepoResult<Option<TaskRecord>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates a task owned by `owner_id`.
    ///
    /// Returns `RepoError::MissingReference` when the owner does not exist.
    pub fn create_task(&self, owner_id: UserId, title: &str) -> RepoResult<TaskRecord> {
        let task = TaskRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: title.trim().to_string(),
            created_at: now_epoch_ms(),
        };

        self.conn
            .execute(
                "INSERT INTO tasks (id, owner_id, title, created_at) VALUES (?1, ?2, ?3, ?4);",
                params![
                    task.id.to_string(),
                    task.owner_id.to_string(),
                    task.title.as_str(),
                    task.created_at
                ],
            )
            .map_err(|err| match constraint_code(&err) {
                Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => RepoError::MissingReference("owner"),
                _ => err.into(),
            })?;

        Ok(task)
    }

    /// Hard-deletes a task and, by cascade, every grant on it.
    ///
    /// Returns whether a row was removed.
    pub fn delete_task(&self, task_id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [task_id.to_string()])?;
        Ok(changed > 0)
    }
}

impl TaskOwnershipOracle for SqliteTaskRepository<'_> {
    fn is_owner(&self, task_id: TaskId, user_id: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1 AND owner_id = ?2);",
            params![task_id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn task_exists(&self, task_id: TaskId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1);",
            [task_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_task(&self, task_id: TaskId) -> RepoResult<Option<TaskRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, owner_id, title, created_at FROM tasks WHERE id = ?1;",
                [task_id.to_string()],
                RawTaskRow::from_row,
            )
            .optional()?;

        row.map(RawTaskRow::into_record).transpose()
    }
}

struct RawTaskRow {
    id: String,
    owner_id: String,
    title: String,
    created_at: i64,
}

impl RawTaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_record(self) -> RepoResult<TaskRecord> {
        Ok(TaskRecord {
            id: parse_uuid(&self.id, "tasks.id")?,
            owner_id: parse_uuid(&self.owner_id, "tasks.owner_id")?,
            title: self.title,
            created_at: self.created_at,
        })
    }
}
