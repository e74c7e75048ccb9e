//! Unit of work grouping the three sharing collaborators.
//!
//! # Responsibility
//! - Hand workflows one consistent view of grants, tasks and users.
//! - Run write workflows inside a single transaction that commits only when
//!   the workflow returns `Ok`.
//! - Let read-only callers work from a shared `&Connection` via
//!   `SqliteStores`, with no exclusive borrow.
//!
//! # Invariants
//! - Any `Err` from a write workflow rolls the transaction back.
//! - SQLite write transactions start with `BEGIN IMMEDIATE`, so the
//!   check-then-write window of one workflow is serialized against other
//!   writers on the same database file.

use crate::repo::access_repo::{AccessGrantStore, SqliteAccessGrantStore};
use crate::repo::task_repo::{SqliteTaskRepository, TaskOwnershipOracle};
use crate::repo::user_repo::{SqliteUserRepository, UserDirectory};
use crate::repo::RepoError;
use rusqlite::{Connection, TransactionBehavior};

/// Collaborators visible to one workflow invocation.
pub trait AccessStores {
    fn grants(&self) -> &dyn AccessGrantStore;
    fn tasks(&self) -> &dyn TaskOwnershipOracle;
    fn users(&self) -> &dyn UserDirectory;
}

/// Scope in which read-only work sees the collaborators.
pub trait ReadScope {
    /// Runs read-only work without opening a transaction.
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>;
}

/// Read scope that can also run work atomically.
pub trait UnitOfWork: ReadScope {
    /// Runs work atomically: committed on `Ok`, discarded on `Err`.
    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>;
}

impl<R: ReadScope> ReadScope for &R {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        (**self).read(work)
    }
}

impl<R: ReadScope> ReadScope for &mut R {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        (**self).read(work)
    }
}

impl<W: UnitOfWork> UnitOfWork for &mut W {
    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        (**self).write(work)
    }
}

/// SQLite repositories sharing one connection or transaction.
pub struct SqliteStores<'conn> {
    grants: SqliteAccessGrantStore<'conn>,
    tasks: SqliteTaskRepository<'conn>,
    users: SqliteUserRepository<'conn>,
}

impl<'conn> SqliteStores<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            grants: SqliteAccessGrantStore::new(conn),
            tasks: SqliteTaskRepository::new(conn),
            users: SqliteUserRepository::new(conn),
        }
    }
}

/// Read-only scope over a shared connection borrow.
impl ReadScope for SqliteStores<'_> {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        work(self)
    }
}

impl AccessStores for SqliteStores<'_> {
    fn grants(&self) -> &dyn AccessGrantStore {
        &self.grants
    }

    fn tasks(&self) -> &dyn TaskOwnershipOracle {
        &self.tasks
    }

    fn users(&self) -> &dyn UserDirectory {
        &self.users
    }
}

/// SQLite unit of work over a migrated connection.
pub struct SqliteUnitOfWork<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUnitOfWork<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl ReadScope for SqliteUnitOfWork<'_> {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        SqliteStores::new(&*self.conn).read(work)
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn AccessStores) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;

        let value = {
            let stores = SqliteStores::new(&tx);
            work(&stores)?
        };

        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}
