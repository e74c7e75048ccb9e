//! Repository layer: collaborator contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define one small data-access trait per collaborator (grants, task
//!   ownership, user directory).
//! - Isolate SQL details from workflow orchestration.
//! - Group collaborators into a unit of work so a workflow's checks and its
//!   write share one transaction.
//!
//! # Invariants
//! - Storage constraint violations surface as semantic `RepoError` variants,
//!   never as raw SQLite errors.

use crate::db::DbError;
use crate::model::task::TaskId;
use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod access_repo;
pub mod task_repo;
pub mod unit_of_work;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for sharing persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Uniqueness constraint on `(task_id, user_id)` rejected an insert.
    DuplicateGrant { task_id: TaskId, user_id: UserId },
    /// Storage refused a grant naming the task owner.
    OwnerGrant { task_id: TaskId, user_id: UserId },
    /// Email is already registered to another user.
    DuplicateEmail,
    /// Foreign key target is missing.
    MissingReference(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateGrant { task_id, user_id } => {
                write!(f, "access grant already exists: task {task_id}, user {user_id}")
            }
            Self::OwnerGrant { task_id, user_id } => {
                write!(f, "user {user_id} owns task {task_id} and cannot hold a grant")
            }
            Self::DuplicateEmail => write!(f, "email is already registered"),
            Self::MissingReference(target) => write!(f, "referenced {target} does not exist"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns the SQLite extended result code when `err` is a constraint failure.
pub(crate) fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(failure.extended_code)
        }
        _ => None,
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn count_to_u64(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` for {column}")))
}
