//! Revocation workflow: four ways to remove grants.
//!
//! # Responsibility
//! - `revoke`: one grant addressed by its `(task, grantee)` pair.
//! - `revoke_by_email`: one grant addressed by the grantee's email.
//! - `revoke_all_for_task`: every grant on one task, owner only.
//! - `revoke_all_for_user`: every grant naming the caller.
//!
//! # Invariants
//! - Each path checks its own authorization rule before deleting.
//! - A failed precondition returns before any delete is issued.
//! - Revoke-by-email never discloses whether an email is registered.

use crate::model::email::normalize_email;
use crate::model::task::TaskId;
use crate::model::user::UserId;
use crate::repo::unit_of_work::{AccessStores, UnitOfWork};
use crate::service::access_error::{
    AccessError, AccessResult, ACCESS_NOT_DELETED, ACCESS_NOT_FOUND, NO_PERMISSION_TO_DELETE,
    NO_SHARED_ACCESSES, NO_TASKS_SHARED_WITH_YOU, ONLY_OWNER_CAN_DELETE, OPERATION_ERROR,
    OWNER_HAS_NO_ACCESS, REQUESTER_HAS_NO_ACCESS,
};
use crate::service::guard::check_access;
use crate::service::log_outcome;
use log::info;
use std::time::Instant;

/// Removes access grants.
pub struct RevocationWorkflow<W: UnitOfWork> {
    uow: W,
}

impl<W: UnitOfWork> RevocationWorkflow<W> {
    pub fn new(uow: W) -> Self {
        Self { uow }
    }

    /// Removes the grant of `grantee_id` on `task_id`.
    ///
    /// `requester_id` must itself have access to the task (owner or grantee).
    pub fn revoke(
        &mut self,
        task_id: TaskId,
        grantee_id: UserId,
        requester_id: UserId,
    ) -> AccessResult<()> {
        let started_at = Instant::now();
        info!(
            "event=access_revoke module=service status=start task_id={task_id} grantee_id={grantee_id} requester_id={requester_id}"
        );

        let outcome = self
            .uow
            .write(|stores| revoke_one(stores, task_id, grantee_id, requester_id));
        log_outcome("access_revoke", started_at, &outcome);
        outcome
    }

    /// Removes the grant held by the user registered under `email`.
    pub fn revoke_by_email(
        &mut self,
        task_id: TaskId,
        owner_id: UserId,
        email: &str,
    ) -> AccessResult<()> {
        let started_at = Instant::now();
        info!(
            "event=access_revoke_by_email module=service status=start task_id={task_id} owner_id={owner_id}"
        );

        let outcome = self
            .uow
            .write(|stores| revoke_by_email(stores, task_id, owner_id, email));
        log_outcome("access_revoke_by_email", started_at, &outcome);
        outcome
    }

    /// Removes every grant on `task_id`. Returns the number removed.
    pub fn revoke_all_for_task(&mut self, task_id: TaskId, owner_id: UserId) -> AccessResult<usize> {
        let started_at = Instant::now();
        info!(
            "event=access_revoke_task module=service status=start task_id={task_id} owner_id={owner_id}"
        );

        let outcome = self
            .uow
            .write(|stores| revoke_all_for_task(stores, task_id, owner_id));
        if let Ok(removed) = &outcome {
            info!("event=access_revoke_task module=service task_id={task_id} removed={removed}");
        }
        log_outcome("access_revoke_task", started_at, &outcome);
        outcome
    }

    /// Removes every grant naming `user_id`. Returns the number removed.
    pub fn revoke_all_for_user(&mut self, user_id: UserId) -> AccessResult<usize> {
        let started_at = Instant::now();
        info!("event=access_revoke_user module=service status=start user_id={user_id}");

        let outcome = self
            .uow
            .write(|stores| revoke_all_for_user(stores, user_id));
        if let Ok(removed) = &outcome {
            info!("event=access_revoke_user module=service user_id={user_id} removed={removed}");
        }
        log_outcome("access_revoke_user", started_at, &outcome);
        outcome
    }
}

fn revoke_one(
    stores: &dyn AccessStores,
    task_id: TaskId,
    grantee_id: UserId,
    requester_id: UserId,
) -> AccessResult<()> {
    if !check_access(stores, task_id, requester_id)? {
        return Err(AccessError::Validation(REQUESTER_HAS_NO_ACCESS));
    }

    match stores.grants().delete_one(task_id, grantee_id)? {
        0 => Err(AccessError::NotFound(ACCESS_NOT_FOUND)),
        _ => Ok(()),
    }
}

fn revoke_by_email(
    stores: &dyn AccessStores,
    task_id: TaskId,
    owner_id: UserId,
    email: &str,
) -> AccessResult<()> {
    if !stores.tasks().is_owner(task_id, owner_id)? {
        return Err(AccessError::Validation(OWNER_HAS_NO_ACCESS));
    }

    let grantee = stores
        .users()
        .resolve_by_email(&normalize_email(email))?
        .ok_or(AccessError::InvalidOperation(OPERATION_ERROR))?;

    match stores.grants().delete_one(task_id, grantee.id)? {
        0 => Err(AccessError::InvalidOperation(ACCESS_NOT_DELETED)),
        _ => Ok(()),
    }
}

fn revoke_all_for_task(
    stores: &dyn AccessStores,
    task_id: TaskId,
    owner_id: UserId,
) -> AccessResult<usize> {
    if !stores.tasks().task_exists(task_id)? {
        return Err(AccessError::Validation(ONLY_OWNER_CAN_DELETE));
    }
    if !stores.tasks().is_owner(task_id, owner_id)? {
        return Err(AccessError::Validation(NO_PERMISSION_TO_DELETE));
    }
    if !stores.grants().exists_for_task(task_id)? {
        return Err(AccessError::Validation(NO_SHARED_ACCESSES));
    }

    Ok(stores.grants().delete_all_by_task(task_id)?)
}

fn revoke_all_for_user(stores: &dyn AccessStores, user_id: UserId) -> AccessResult<usize> {
    if !stores.grants().exists_for_user(user_id)? {
        return Err(AccessError::InvalidOperation(NO_TASKS_SHARED_WITH_YOU));
    }

    Ok(stores.grants().delete_all_by_user(user_id)?)
}
