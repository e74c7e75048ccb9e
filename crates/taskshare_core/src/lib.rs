//! Task sharing core.
//! Grants, revocations and the access decision every other subsystem asks.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::access::AccessGrant;
pub use model::email::{normalize_email, parse_email};
pub use model::page::{Page, PageRequest};
pub use model::task::{TaskId, TaskRecord};
pub use model::user::{UserId, UserIdentity};
pub use repo::access_repo::{AccessGrantStore, SqliteAccessGrantStore};
pub use repo::task_repo::{SqliteTaskRepository, TaskOwnershipOracle};
pub use repo::unit_of_work::{
    AccessStores, ReadScope, SqliteStores, SqliteUnitOfWork, UnitOfWork,
};
pub use repo::user_repo::{SqliteUserRepository, UserDirectory};
pub use repo::{RepoError, RepoResult};
pub use service::access_error::{AccessError, AccessErrorCode, AccessResult};
pub use service::access_query_service::{AccessQueryService, SharedTask, TaskGrantee};
pub use service::grant_service::GrantWorkflow;
pub use service::guard::{check_access, AuthorizationGuard};
pub use service::revocation_service::RevocationWorkflow;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
