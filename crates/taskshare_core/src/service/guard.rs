//! Authorization guard: owner OR live grant.
//!
//! # Invariants
//! - Owners always pass without a grant row.
//! - A grant on a task that no longer exists never authorizes anything.
//! - No side effects; safe to call concurrently.

use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::repo::unit_of_work::{AccessStores, ReadScope};
use crate::repo::RepoResult;
use crate::service::access_error::{AccessError, AccessResult, REQUESTER_HAS_NO_ACCESS};
use log::debug;

/// Decides whether `user_id` may act on `task_id` using the given stores.
///
/// Shared with workflows that must check access inside their own unit of work.
pub fn check_access(
    stores: &dyn AccessStores,
    task_id: TaskId,
    user_id: UserId,
) -> RepoResult<bool> {
    if stores.tasks().is_owner(task_id, user_id)? {
        return Ok(true);
    }
    if !stores.grants().exists(task_id, user_id)? {
        return Ok(false);
    }
    // Orphaned grant rows are not authoritative.
    stores.tasks().task_exists(task_id)
}

/// Single access decision consumed by task and comment handlers.
pub struct AuthorizationGuard<R: ReadScope> {
    scope: R,
}

impl<R: ReadScope> AuthorizationGuard<R> {
    pub fn new(scope: R) -> Self {
        Self { scope }
    }

    /// Returns true if `user_id` owns `task_id` or holds a live grant on it.
    pub fn has_access(&self, task_id: TaskId, user_id: UserId) -> AccessResult<bool> {
        let allowed = self
            .scope
            .read(|stores| check_access(stores, task_id, user_id).map_err(AccessError::from))?;
        debug!(
            "event=access_check module=guard status=ok task_id={task_id} user_id={user_id} allowed={allowed}"
        );
        Ok(allowed)
    }

    /// Fails with a validation error unless `user_id` has access to `task_id`.
    pub fn ensure_access(&self, task_id: TaskId, user_id: UserId) -> AccessResult<()> {
        if self.has_access(task_id, user_id)? {
            Ok(())
        } else {
            Err(AccessError::Validation(REQUESTER_HAS_NO_ACCESS))
        }
    }
}
