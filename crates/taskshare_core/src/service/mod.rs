//! Sharing use-case services.
//!
//! # Responsibility
//! - Expose one method per workflow variant; writers run over a
//!   `UnitOfWork`, readers over any `ReadScope`.
//! - Validate every precondition before any write.
//! - Emit one metadata-only log event per workflow outcome.

use crate::service::access_error::{AccessError, AccessResult};
use log::{error, info};
use std::time::Instant;

pub mod access_error;
pub mod access_query_service;
pub mod grant_service;
pub mod guard;
pub mod revocation_service;

pub(crate) fn log_outcome<T>(event: &'static str, started_at: Instant, outcome: &AccessResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(_) => info!("event={event} module=service status=ok duration_ms={duration_ms}"),
        Err(AccessError::Repo(err)) => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code=repo_error error={err}"
        ),
        Err(err) => info!(
            "event={event} module=service status=rejected duration_ms={duration_ms} error_code={}",
            err.log_code()
        ),
    }
}
