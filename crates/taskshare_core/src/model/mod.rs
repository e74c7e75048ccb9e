//! Domain records for task sharing.
//!
//! # Responsibility
//! - Define the grant entity and the task/user projections it references.
//! - Own input normalization shared by every workflow (email, paging).
//!
//! # Invariants
//! - A grant is identified only by its `(task_id, user_id)` pair.
//! - Grants are never updated in place.

pub mod access;
pub mod email;
pub mod page;
pub mod task;
pub mod user;
