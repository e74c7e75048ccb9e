//! Read-side projections over grants.
//!
//! # Invariants
//! - `get_shared_task` answers from grants only; ownership is not a fallback.
//! - Lists are ordered by grant creation, oldest first.
//! - Orphaned grants are excluded by the store, so `total_count` counts
//!   exactly the grants that can appear in `items`.

use crate::model::page::{Page, PageRequest};
use crate::model::task::{TaskId, TaskRecord};
use crate::model::user::UserId;
use crate::repo::unit_of_work::{AccessStores, ReadScope};
use crate::service::access_error::{
    AccessError, AccessResult, TASK_NOT_FOUND, TASK_NOT_FOUND_OR_FORBIDDEN,
};
use crate::service::log_outcome;
use log::warn;
use serde::Serialize;
use std::time::Instant;

/// A task as seen by one of its grantees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedTask {
    pub task: TaskRecord,
    /// Grant creation time, Unix epoch milliseconds.
    pub shared_at: i64,
}

/// One user holding a grant on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGrantee {
    pub id: UserId,
    pub email: String,
    /// Grant creation time, Unix epoch milliseconds.
    pub granted_at: i64,
}

/// Grant-backed queries for grantees and owners.
pub struct AccessQueryService<R: ReadScope> {
    scope: R,
}

impl<R: ReadScope> AccessQueryService<R> {
    pub fn new(scope: R) -> Self {
        Self { scope }
    }

    /// Returns `task_id` if `user_id` holds a grant on it.
    pub fn get_shared_task(&self, task_id: TaskId, user_id: UserId) -> AccessResult<SharedTask> {
        let started_at = Instant::now();
        let outcome = self
            .scope
            .read(|stores| load_shared_task(stores, task_id, user_id));
        log_outcome("shared_task_get", started_at, &outcome);
        outcome
    }

    /// Lists tasks shared with `user_id`.
    pub fn list_shared_tasks(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> AccessResult<Page<SharedTask>> {
        let started_at = Instant::now();
        let outcome = self
            .scope
            .read(|stores| load_shared_tasks(stores, user_id, page));
        log_outcome("shared_task_list", started_at, &outcome);
        outcome
    }

    /// Lists users holding a grant on `task_id`. Owner only.
    pub fn list_task_grantees(
        &self,
        task_id: TaskId,
        owner_id: UserId,
        page: PageRequest,
    ) -> AccessResult<Page<TaskGrantee>> {
        let started_at = Instant::now();
        let outcome = self
            .scope
            .read(|stores| load_task_grantees(stores, task_id, owner_id, page));
        log_outcome("task_grantee_list", started_at, &outcome);
        outcome
    }
}

fn load_shared_task(
    stores: &dyn AccessStores,
    task_id: TaskId,
    user_id: UserId,
) -> AccessResult<SharedTask> {
    let grant = stores
        .grants()
        .find(task_id, user_id)?
        .ok_or(AccessError::NotFound(TASK_NOT_FOUND))?;
    let task = stores
        .tasks()
        .get_task(task_id)?
        .ok_or(AccessError::NotFound(TASK_NOT_FOUND))?;

    Ok(SharedTask {
        task,
        shared_at: grant.created_at,
    })
}

fn load_shared_tasks(
    stores: &dyn AccessStores,
    user_id: UserId,
    page: PageRequest,
) -> AccessResult<Page<SharedTask>> {
    let (grants, total) = stores.grants().paged_by_user(user_id, page)?;
    let mut items = Vec::with_capacity(grants.len());
    for grant in grants {
        match stores.tasks().get_task(grant.task_id)? {
            Some(task) => items.push(SharedTask {
                task,
                shared_at: grant.created_at,
            }),
            None => warn!(
                "event=shared_task_list module=service status=skip reason=orphan_grant task_id={}",
                grant.task_id
            ),
        }
    }
    Ok(Page::new(items, total, page))
}

fn load_task_grantees(
    stores: &dyn AccessStores,
    task_id: TaskId,
    owner_id: UserId,
    page: PageRequest,
) -> AccessResult<Page<TaskGrantee>> {
    if !stores.tasks().is_owner(task_id, owner_id)? {
        return Err(AccessError::NotFound(TASK_NOT_FOUND_OR_FORBIDDEN));
    }

    let (grants, total) = stores.grants().paged_by_task(task_id, page)?;
    let mut items = Vec::with_capacity(grants.len());
    for grant in grants {
        match stores.users().resolve_by_id(grant.user_id)? {
            Some(user) => items.push(TaskGrantee {
                id: user.id,
                email: user.email,
                granted_at: grant.created_at,
            }),
            None => warn!(
                "event=task_grantee_list module=service status=skip reason=unknown_user task_id={task_id}"
            ),
        }
    }
    Ok(Page::new(items, total, page))
}
