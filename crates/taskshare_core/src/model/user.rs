//! User identity referenced by sharing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier, already authenticated upstream.
pub type UserId = Uuid;

/// Resolved user identity returned by the directory.
///
/// `email` is stored and returned in normalized (trimmed, lowercase) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
}
