#![allow(dead_code)]

use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use taskshare_core::db::open_db_in_memory;
use taskshare_core::{
    AccessGrant, AccessGrantStore, AccessQueryService, AccessResult, AccessStores,
    AuthorizationGuard, GrantWorkflow, PageRequest, ReadScope, RepoError, RepoResult,
    RevocationWorkflow, SqliteAccessGrantStore, SqliteStores, SqliteTaskRepository,
    SqliteUnitOfWork, SqliteUserRepository, TaskId, TaskOwnershipOracle, TaskRecord, UnitOfWork,
    UserDirectory, UserId, UserIdentity,
};
use uuid::Uuid;

/// In-memory database with one owner, one grantee and one task.
pub struct Fixture {
    pub conn: Connection,
    pub owner: UserIdentity,
    pub grantee: UserIdentity,
    pub task: TaskRecord,
}

impl Fixture {
    pub fn new() -> Self {
        let conn = open_db_in_memory().unwrap();
        let owner = add_user(&conn, "owner@test.com");
        let grantee = add_user(&conn, "grantee@x.com");
        let task = add_task(&conn, owner.id, "Write report");
        Self {
            conn,
            owner,
            grantee,
            task,
        }
    }

    pub fn share(
        &mut self,
        task_id: TaskId,
        owner_id: UserId,
        email: &str,
    ) -> AccessResult<UserIdentity> {
        GrantWorkflow::new(SqliteUnitOfWork::new(&mut self.conn)).create(task_id, owner_id, email)
    }

    pub fn share_with_grantee(&mut self) -> UserIdentity {
        let (task_id, owner_id) = (self.task.id, self.owner.id);
        self.share(task_id, owner_id, "grantee@x.com").unwrap()
    }

    pub fn revocations(&mut self) -> RevocationWorkflow<SqliteUnitOfWork<'_>> {
        RevocationWorkflow::new(SqliteUnitOfWork::new(&mut self.conn))
    }

    pub fn queries(&self) -> AccessQueryService<SqliteStores<'_>> {
        AccessQueryService::new(SqliteStores::new(&self.conn))
    }

    pub fn guard(&self) -> AuthorizationGuard<SqliteStores<'_>> {
        AuthorizationGuard::new(SqliteStores::new(&self.conn))
    }

    pub fn has_access(&self, task_id: TaskId, user_id: UserId) -> bool {
        self.guard()
            .has_access(task_id, user_id)
            .unwrap()
    }

    pub fn grant_exists(&self, task_id: TaskId, user_id: UserId) -> bool {
        SqliteAccessGrantStore::new(&self.conn)
            .exists(task_id, user_id)
            .unwrap()
    }

    pub fn grant_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM task_accesses;", [], |row| row.get(0))
            .unwrap()
    }

    pub fn add_user(&self, email: &str) -> UserIdentity {
        add_user(&self.conn, email)
    }

    pub fn add_task(&self, owner_id: UserId, title: &str) -> TaskRecord {
        add_task(&self.conn, owner_id, title)
    }
}

pub fn add_user(conn: &Connection, email: &str) -> UserIdentity {
    SqliteUserRepository::new(conn).create_user(email).unwrap()
}

pub fn add_task(conn: &Connection, owner_id: UserId, title: &str) -> TaskRecord {
    SqliteTaskRepository::new(conn)
        .create_task(owner_id, title)
        .unwrap()
}

/// Collaborator fake that records write calls.
///
/// Writes are not rolled back on `Err`; workflows are expected to finish all
/// checks before writing.
#[derive(Default)]
pub struct InMemoryStores {
    pub users: RefCell<Vec<UserIdentity>>,
    pub tasks: RefCell<Vec<TaskRecord>>,
    pub grants: RefCell<Vec<AccessGrant>>,
    pub add_calls: Cell<usize>,
    pub delete_calls: Cell<usize>,
    /// Makes `exists` always answer `false`, as a concurrent writer could.
    pub stale_exists: Cell<bool>,
}

impl InMemoryStores {
    pub fn add_user(&self, email: &str) -> UserIdentity {
        let user = UserIdentity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.users.borrow_mut().push(user.clone());
        user
    }

    pub fn add_task(&self, owner_id: UserId) -> TaskRecord {
        let task = TaskRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: "fake task".to_string(),
            created_at: 1,
        };
        self.tasks.borrow_mut().push(task.clone());
        task
    }

    pub fn insert_grant(&self, task_id: TaskId, user_id: UserId, created_at: i64) {
        self.grants.borrow_mut().push(AccessGrant {
            task_id,
            user_id,
            created_at,
        });
    }

    pub fn remove_task(&self, task_id: TaskId) {
        self.tasks.borrow_mut().retain(|task| task.id != task_id);
    }

    pub fn remove_user(&self, user_id: UserId) {
        self.users.borrow_mut().retain(|user| user.id != user_id);
    }

    pub fn writes(&self) -> usize {
        self.add_calls.get() + self.delete_calls.get()
    }

    fn delete_where(&self, predicate: impl Fn(&AccessGrant) -> bool) -> usize {
        self.delete_calls.set(self.delete_calls.get() + 1);
        let mut grants = self.grants.borrow_mut();
        let before = grants.len();
        grants.retain(|grant| !predicate(grant));
        before - grants.len()
    }

    fn paged_where(
        &self,
        predicate: impl Fn(&AccessGrant) -> bool,
        page: PageRequest,
    ) -> (Vec<AccessGrant>, u64) {
        let mut matching: Vec<AccessGrant> = self
            .grants
            .borrow()
            .iter()
            .filter(|grant| predicate(grant))
            .copied()
            .collect();
        matching.sort_by_key(|grant| (grant.created_at, grant.task_id, grant.user_id));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        (items, total)
    }
}

impl AccessGrantStore for InMemoryStores {
    fn exists(&self, task_id: TaskId, user_id: UserId) -> RepoResult<bool> {
        if self.stale_exists.get() {
            return Ok(false);
        }
        Ok(self.find(task_id, user_id)?.is_some())
    }

    fn find(&self, task_id: TaskId, user_id: UserId) -> RepoResult<Option<AccessGrant>> {
        Ok(self
            .grants
            .borrow()
            .iter()
            .find(|grant| grant.key() == (task_id, user_id))
            .copied())
    }

    fn add(&self, grant: &AccessGrant) -> RepoResult<()> {
        self.add_calls.set(self.add_calls.get() + 1);
        if self.find(grant.task_id, grant.user_id)?.is_some() {
            return Err(RepoError::DuplicateGrant {
                task_id: grant.task_id,
                user_id: grant.user_id,
            });
        }
        if self.is_owner(grant.task_id, grant.user_id)? {
            return Err(RepoError::OwnerGrant {
                task_id: grant.task_id,
                user_id: grant.user_id,
            });
        }
        self.grants.borrow_mut().push(*grant);
        Ok(())
    }

    fn delete_one(&self, task_id: TaskId, user_id: UserId) -> RepoResult<usize> {
        Ok(self.delete_where(|grant| grant.key() == (task_id, user_id)))
    }

    fn delete_all_by_task(&self, task_id: TaskId) -> RepoResult<usize> {
        Ok(self.delete_where(|grant| grant.task_id == task_id))
    }

    fn delete_all_by_user(&self, user_id: UserId) -> RepoResult<usize> {
        Ok(self.delete_where(|grant| grant.user_id == user_id))
    }

    fn exists_for_task(&self, task_id: TaskId) -> RepoResult<bool> {
        Ok(self.grants.borrow().iter().any(|grant| grant.task_id == task_id))
    }

    fn exists_for_user(&self, user_id: UserId) -> RepoResult<bool> {
        Ok(self.grants.borrow().iter().any(|grant| grant.user_id == user_id))
    }

    fn paged_by_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)> {
        let tasks = self.tasks.borrow();
        Ok(self.paged_where(
            |grant| {
                grant.user_id == user_id && tasks.iter().any(|task| task.id == grant.task_id)
            },
            page,
        ))
    }

    fn paged_by_task(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> RepoResult<(Vec<AccessGrant>, u64)> {
        let users = self.users.borrow();
        Ok(self.paged_where(
            |grant| {
                grant.task_id == task_id && users.iter().any(|user| user.id == grant.user_id)
            },
            page,
        ))
    }
}

impl TaskOwnershipOracle for InMemoryStores {
    fn is_owner(&self, task_id: TaskId, user_id: UserId) -> RepoResult<bool> {
        Ok(self
            .tasks
            .borrow()
            .iter()
            .any(|task| task.id == task_id && task.owner_id == user_id))
    }

    fn task_exists(&self, task_id: TaskId) -> RepoResult<bool> {
        Ok(self.tasks.borrow().iter().any(|task| task.id == task_id))
    }

    fn get_task(&self, task_id: TaskId) -> RepoResult<Option<TaskRecord>> {
        Ok(self
            .tasks
            .borrow()
            .iter()
            .find(|task| task.id == task_id)
            .cloned())
    }
}

impl UserDirectory for InMemoryStores {
    fn resolve_by_email(&self, normalized_email: &str) -> RepoResult<Option<UserIdentity>> {
        Ok(self
            .users
            .borrow()
            .iter()
            .find(|user| user.email == normalized_email)
            .cloned())
    }

    fn resolve_by_id(&self, user_id: UserId) -> RepoResult<Option<UserIdentity>> {
        Ok(self
            .users
            .borrow()
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }
}

impl AccessStores for InMemoryStores {
    fn grants(&self) -> &dyn AccessGrantStore {
        self
    }

    fn tasks(&self) -> &dyn TaskOwnershipOracle {
        self
    }

    fn users(&self) -> &dyn UserDirectory {
        self
    }
}

impl ReadScope for InMemoryStores {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        work(self)
    }
}

impl UnitOfWork for InMemoryStores {
    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        work(&*self)
    }
}
