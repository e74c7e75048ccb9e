//! Access grant entity.
//!
//! # Invariants
//! - At most one grant exists per `(task_id, user_id)`.
//! - `user_id` never equals the owner of `task_id`.
//! - `created_at` is set once at creation and never changes.

use crate::model::task::TaskId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Read visibility of one task delegated to one non-owner user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrant {
    pub task_id: TaskId,
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl AccessGrant {
    /// Creates a grant stamped with the current wall clock.
    pub fn new(task_id: TaskId, user_id: UserId) -> Self {
        Self {
            task_id,
            user_id,
            created_at: now_epoch_ms(),
        }
    }

    /// Natural key of this grant.
    pub fn key(&self) -> (TaskId, UserId) {
        (self.task_id, self.user_id)
    }
}

/// Current wall clock in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
