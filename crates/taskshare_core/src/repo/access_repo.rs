//! Access grant store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist grant rows keyed by `(task_id, user_id)`.
//! - Provide existence checks, single/bulk deletes and paged lookups.
//!
//! # Invariants
//! - The `(task_id, user_id)` primary key is the authoritative uniqueness
//!   guarantee; a violating insert returns `RepoError::DuplicateGrant`.
//! - Paged lookups order by `created_at ASC` with the other key column as
//!   tie-breaker, so pages are stable.
//! - Paged lookups skip orphaned grants in both the page and the total.

use crate::model::access::AccessGrant;
use crate::model::page::PageRequest;
use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::repo::{constraint_code, count_to_u64, parse_uuid, RepoError, RepoResult};
use rusqlite::ffi;
use rusqlite::{params, Connection, Row};

const GRANT_SELECT_SQL: &str = "SELECT task_id, user_id, created_at FROM task_accesses";

/// Persistence contract for access grants.
pub trait AccessGrantStore {
    fn exists(&self, task_id: TaskId, user_id: UserId) -> RepoResult<bool>;
    fn find(&self, task_id: TaskId, user_id: UserId) -> RepoResult<Option<AccessGrant>>;
    fn add(&self, grant: &AccessGrant) -> RepoResult<()>;
    /// Returns rows affected (0 or 1).
    fn delete_one(&self, task_id: TaskId, user_id: UserId) -> RepoResult<usize>;
    fn delete_all_by_task(&self, task_id: TaskId) -> RepoResult<usize>;
    fn delete_all_by_user(&self, user_id: UserId) -> RepoResult<usize>;
    fn exists_for_task(&self, task_id: TaskId) -> RepoResult<bool>;
    fn exists_for_user(&self, user_id: UserId) -> RepoResult<bool>;
    /// Grants naming `user_id` on tasks that still exist, oldest first, plus
    /// the unpaged total of those grants.
    fn paged_by_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)>;
    /// Grants on `task_id` naming users that still exist, oldest first, plus
    /// the unpaged total of those grants.
    fn paged_by_task(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)>;
}

/// SQLite-backed grant store. Works on a plain connection or a transaction.
pub struct SqliteAccessGrantStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccessGrantStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists_where(&self, predicate: &str, value: String) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM task_accesses WHERE {predicate});"),
            [value],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Pages grants matching `key_column`, keeping only rows whose
    /// `ref_column` still resolves in `ref_table`, so total and page agree.
    fn paged_where(
        &self,
        key_column: &str,
        ref_column: &str,
        ref_table: &str,
        key: String,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)> {
        let from = format!(
            "FROM task_accesses AS a
             JOIN {ref_table} AS r ON r.id = a.{ref_column}
             WHERE a.{key_column} = ?1"
        );
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {from};"),
            [key.as_str()],
            |row| row.get(0),
        )?;

        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT a.task_id AS task_id, a.user_id AS user_id, a.created_at AS created_at
             {from}
             ORDER BY a.created_at ASC, a.{ref_column} ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![key, i64::from(page.limit()), offset])?;
        let mut grants = Vec::new();
        while let Some(row) = rows.next()? {
            grants.push(parse_grant_row(row)?);
        }

        Ok((grants, count_to_u64(total, "task_accesses")?))
    }
}

impl AccessGrantStore for SqliteAccessGrantStore<'_> {
    fn exists(&self, task_id: TaskId, user_id: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM task_accesses WHERE task_id = ?1 AND user_id = ?2
            );",
            params![task_id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find(&self, task_id: TaskId, user_id: UserId) -> RepoResult<Option<AccessGrant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GRANT_SELECT_SQL} WHERE task_id = ?1 AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![task_id.to_string(), user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_grant_row(row)?)),
            None => Ok(None),
        }
    }

    fn add(&self, grant: &AccessGrant) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO task_accesses (task_id, user_id, created_at) VALUES (?1, ?2, ?3);",
                params![
                    grant.task_id.to_string(),
                    grant.user_id.to_string(),
                    grant.created_at
                ],
            )
            .map_err(|err| classify_insert_error(err, grant))?;
        Ok(())
    }

    fn delete_one(&self, task_id: TaskId, user_id: UserId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM task_accesses WHERE task_id = ?1 AND user_id = ?2;",
            params![task_id.to_string(), user_id.to_string()],
        )?;
        Ok(changed)
    }

    fn delete_all_by_task(&self, task_id: TaskId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM task_accesses WHERE task_id = ?1;",
            [task_id.to_string()],
        )?;
        Ok(changed)
    }

    fn delete_all_by_user(&self, user_id: UserId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM task_accesses WHERE user_id = ?1;",
            [user_id.to_string()],
        )?;
        Ok(changed)
    }

    fn exists_for_task(&self, task_id: TaskId) -> RepoResult<bool> {
        self.exists_where("task_id = ?1", task_id.to_string())
    }

    fn exists_for_user(&self, user_id: UserId) -> RepoResult<bool> {
        self.exists_where("user_id = ?1", user_id.to_string())
    }

    fn paged_by_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)> {
        self.paged_where("user_id", "task_id", "tasks", user_id.to_string(), page)
    }

    fn paged_by_task(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)> {
        self.paged_where("task_id", "user_id", "users", task_id.to_string(), page)
    }
}

fn classify_insert_error(err: rusqlite::Error, grant: &AccessGrant) -> RepoError {
    match constraint_code(&err) {
        Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) | Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => {
            RepoError::DuplicateGrant {
                task_id: grant.task_id,
                user_id: grant.user_id,
            }
        }
        Some(ffi::SQLITE_CONSTRAINT_TRIGGER) => RepoError::OwnerGrant {
            task_id: grant.task_id,
            user_id: grant.user_id,
        },
        Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => RepoError::MissingReference("task or user"),
        _ => err.into(),
    }
}

fn parse_grant_row(row: &Row<'_>) -> RepoResult<AccessGrant> {
    let task_text: String = row.get("task_id")?;
    let user_text: String = row.get("user_id")?;
    Ok(AccessGrant {
        task_id: parse_uuid(&task_text, "task_accesses.task_id")?,
        user_id: parse_uuid(&user_text, "task_accesses.user_id")?,
        created_at: row.get("created_at")?,
    })
}
