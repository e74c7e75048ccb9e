//! Grant workflow: share one task with one user by email.
//!
//! # Invariants
//! - Preconditions run in a fixed order and each fails distinctly.
//! - The insert runs in the same unit of work as the checks.
//! - The existence check is advisory; a uniqueness violation from the store
//!   is reported with the same "already has access" message.

use crate::model::access::AccessGrant;
use crate::model::email::parse_email;
use crate::model::task::TaskId;
use crate::model::user::{UserId, UserIdentity};
use crate::repo::unit_of_work::{AccessStores, UnitOfWork};
use crate::service::access_error::{
    AccessError, AccessResult, ALREADY_HAS_ACCESS, EMAIL_INCORRECT, ONLY_OWNER_CAN_SHARE,
    TASK_NOT_FOUND, USER_IS_OWNER, USER_NOT_FOUND,
};
use crate::service::log_outcome;
use log::info;
use std::time::Instant;

/// Creates access grants.
pub struct GrantWorkflow<W: UnitOfWork> {
    uow: W,
}

impl<W: UnitOfWork> GrantWorkflow<W> {
    pub fn new(uow: W) -> Self {
        Self { uow }
    }

    /// Shares `task_id` with the user registered under `grantee_email`.
    ///
    /// Returns the grantee's resolved identity on success.
    ///
    /// # Errors
    /// - `Validation(EMAIL_INCORRECT)` for blank or malformed email.
    /// - `NotFound(USER_NOT_FOUND)` when no user has that email.
    /// - `NotFound(TASK_NOT_FOUND)` when the task does not exist.
    /// - `Validation(ONLY_OWNER_CAN_SHARE)` when `owner_id` does not own it.
    /// - `Validation(USER_IS_OWNER)` when the grantee is the owner.
    /// - `Validation(ALREADY_HAS_ACCESS)` when a grant already exists.
    pub fn create(
        &mut self,
        task_id: TaskId,
        owner_id: UserId,
        grantee_email: &str,
    ) -> AccessResult<UserIdentity> {
        let started_at = Instant::now();
        info!(
            "event=access_grant module=service status=start task_id={task_id} owner_id={owner_id}"
        );

        let outcome = self
            .uow
            .write(|stores| create_grant(stores, task_id, owner_id, grantee_email));
        log_outcome("access_grant", started_at, &outcome);
        outcome
    }
}

fn create_grant(
    stores: &dyn AccessStores,
    task_id: TaskId,
    owner_id: UserId,
    grantee_email: &str,
) -> AccessResult<UserIdentity> {
    let email = parse_email(grantee_email).ok_or(AccessError::Validation(EMAIL_INCORRECT))?;

    let grantee = stores
        .users()
        .resolve_by_email(&email)?
        .ok_or(AccessError::NotFound(USER_NOT_FOUND))?;

    if !stores.tasks().task_exists(task_id)? {
        return Err(AccessError::NotFound(TASK_NOT_FOUND));
    }
    if !stores.tasks().is_owner(task_id, owner_id)? {
        return Err(AccessError::Validation(ONLY_OWNER_CAN_SHARE));
    }
    if grantee.id == owner_id {
        return Err(AccessError::Validation(USER_IS_OWNER));
    }
    if stores.grants().exists(task_id, grantee.id)? {
        return Err(AccessError::Validation(ALREADY_HAS_ACCESS));
    }

    stores.grants().add(&AccessGrant::new(task_id, grantee.id))?;
    Ok(grantee)
}
