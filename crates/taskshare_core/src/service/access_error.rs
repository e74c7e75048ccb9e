//! Typed outcome for sharing workflows.
//!
//! # Responsibility
//! - Carry expected business failures as code + message values.
//! - Keep unexpected persistence failures in a separate variant callers
//!   propagate unchanged.
//!
//! # Invariants
//! - Messages are stable, user-facing strings.
//! - Storage constraint violations on grant insert map to the same
//!   validation failures their advisory pre-checks report.

use crate::repo::RepoError;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EMAIL_INCORRECT: &str = "Email address is incorrect.";
pub const USER_NOT_FOUND: &str = "User not found.";
pub const TASK_NOT_FOUND: &str = "Task not found.";
pub const ONLY_OWNER_CAN_SHARE: &str = "Only the task owner can share this task.";
pub const USER_IS_OWNER: &str = "User is owner in this task.";
pub const ALREADY_HAS_ACCESS: &str = "User already has access to this task.";
pub const REQUESTER_HAS_NO_ACCESS: &str = "User hasn't access with this task.";
pub const ACCESS_NOT_FOUND: &str = "Access not found.";
pub const OWNER_HAS_NO_ACCESS: &str = "User doesn't have access to this task.";
pub const OPERATION_ERROR: &str = "Operation error.";
pub const ACCESS_NOT_DELETED: &str = "Access doesn't deleted.";
pub const ONLY_OWNER_CAN_DELETE: &str = "Only the task owner can delete accesses.";
pub const NO_PERMISSION_TO_DELETE: &str =
    "You do not have permission to delete accesses for this task.";
pub const NO_SHARED_ACCESSES: &str = "There are no shared accesses for this task.";
pub const NO_TASKS_SHARED_WITH_YOU: &str = "There are no tasks shared with you.";
pub const TASK_NOT_FOUND_OR_FORBIDDEN: &str = "Task not found or you do not have permission.";

pub type AccessResult<T> = Result<T, AccessError>;

/// Failure category for expected outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessErrorCode {
    /// Task or user does not exist.
    NotFound,
    /// Business rule known in advance was violated.
    ValidationError,
    /// A delete affected nothing, or a lookup failure must not be disclosed.
    InvalidOperation,
}

impl AccessErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ValidationError => "validation_error",
            Self::InvalidOperation => "invalid_operation",
        }
    }
}

/// Error returned by every sharing workflow and query.
#[derive(Debug)]
pub enum AccessError {
    NotFound(&'static str),
    Validation(&'static str),
    InvalidOperation(&'static str),
    /// Unexpected persistence failure; fatal to the request.
    Repo(RepoError),
}

impl AccessError {
    /// Category of an expected failure, `None` for persistence failures.
    pub fn code(&self) -> Option<AccessErrorCode> {
        match self {
            Self::NotFound(_) => Some(AccessErrorCode::NotFound),
            Self::Validation(_) => Some(AccessErrorCode::ValidationError),
            Self::InvalidOperation(_) => Some(AccessErrorCode::InvalidOperation),
            Self::Repo(_) => None,
        }
    }

    /// User-facing message of an expected failure.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(message)
            | Self::Validation(message)
            | Self::InvalidOperation(message) => Some(*message),
            Self::Repo(_) => None,
        }
    }

    /// Stable code for log lines.
    pub(crate) fn log_code(&self) -> &'static str {
        self.code().map_or("repo_error", AccessErrorCode::as_str)
    }
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(message)
            | Self::Validation(message)
            | Self::InvalidOperation(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccessError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateGrant { .. } => Self::Validation(ALREADY_HAS_ACCESS),
            RepoError::OwnerGrant { .. } => Self::Validation(USER_IS_OWNER),
            other => Self::Repo(other),
        }
    }
}
