//! Task projection referenced by sharing.
//!
//! Task CRUD lives outside this crate; only identity, ownership and the
//! fields returned to grantees are modelled here.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Read model of one task as seen through ownership or a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub owner_id: UserId,
    pub title: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
