//! User directory contract and SQLite implementation.
//!
//! # Invariants
//! - Emails are persisted normalized and compared case-insensitively.

use crate::model::email::normalize_email;
use crate::model::user::{UserId, UserIdentity};
use crate::repo::{constraint_code, parse_uuid, RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, OptionalExtension};
use uuid::Uuid;

/// Resolves users by id or normalized email.
pub trait UserDirectory {
    fn resolve_by_email(&self, normalized_email: &str) -> RepoResult<Option<UserIdentity>>;
    fn resolve_by_id(&self, user_id: UserId) -> RepoResult<Option<UserIdentity>>;
}

/// SQLite-backed user directory.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Registers a user under the normalized form of `email`.
    pub fn create_user(&self, email: &str) -> RepoResult<UserIdentity> {
        let user = UserIdentity {
            id: Uuid::new_v4(),
            email: normalize_email(email),
        };

        self.conn
            .execute(
                "INSERT INTO users (id, email) VALUES (?1, ?2);",
                params![user.id.to_string(), user.email.as_str()],
            )
            .map_err(|err| match constraint_code(&err) {
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => RepoError::DuplicateEmail,
                _ => err.into(),
            })?;

        Ok(user)
    }

    fn resolve_where(&self, predicate: &str, value: String) -> RepoResult<Option<UserIdentity>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT id, email FROM users WHERE {predicate};"),
                [value],
                |row| Ok((row.get::<_, String>("id")?, row.get::<_, String>("email")?)),
            )
            .optional()?;

        match row {
            Some((id, email)) => Ok(Some(UserIdentity {
                id: parse_uuid(&id, "users.id")?,
                email,
            })),
            None => Ok(None),
        }
    }
}

impl UserDirectory for SqliteUserRepository<'_> {
    fn resolve_by_email(&self, normalized_email: &str) -> RepoResult<Option<UserIdentity>> {
        if normalized_email.is_empty() {
            return Ok(None);
        }
        self.resolve_where("email = ?1", normalized_email.to_string())
    }

    fn resolve_by_id(&self, user_id: UserId) -> RepoResult<Option<UserIdentity>> {
        self.resolve_where("id = ?1", user_id.to_string())
    }
}
