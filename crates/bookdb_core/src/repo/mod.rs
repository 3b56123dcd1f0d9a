//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define one capability trait per entity (`add`, `update`, `get`,
//!   `get_all`, `delete`).
//! - Keep SQL inside the SQLite implementations; keep an in-memory twin
//!   that honors the same contract.
//!
//! # Invariants
//! - Writes validate the entity before touching the store.
//! - `add` sets the identity on the caller's object only on success.
//! - `update` on an unknown identity is not an error; it reports `false`.

use log::{debug, error, warn};
use std::time::Instant;

pub mod author_repo;
pub mod book_repo;
mod error;
pub mod memory;

pub use error::{PersistenceCause, RepoError, RepoResult};

/// Runs one repository operation and emits its `repo_call` event.
pub(crate) fn instrumented<T>(
    op: &'static str,
    id: Option<i64>,
    body: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = body();
    log_outcome(op, id, started_at, &result);
    result
}

/// Like `instrumented`, for inserts: the event carries the assigned identity.
pub(crate) fn instrumented_insert(
    op: &'static str,
    body: impl FnOnce() -> RepoResult<i64>,
) -> RepoResult<i64> {
    let started_at = Instant::now();
    let result = body();
    log_outcome(op, result.as_ref().ok().copied(), started_at, &result);
    result
}

fn log_outcome<T>(op: &'static str, id: Option<i64>, started_at: Instant, result: &RepoResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    let id = id.map_or_else(|| "none".to_string(), |id| id.to_string());

    match result {
        Ok(_) => debug!("event=repo_call module=repo op={op} status=ok id={id} duration_ms={duration_ms}"),
        Err(err) if err.is_validation() => warn!(
            "event=repo_call module=repo op={op} status=rejected id={id} duration_ms={duration_ms} error={err}"
        ),
        Err(err) => error!(
            "event=repo_call module=repo op={op} status=error id={id} duration_ms={duration_ms} error={err}"
        ),
    }
}

/// Logs the zero-row `update` anomaly and passes the match flag through.
pub(crate) fn report_update(op: &'static str, id: i64, changed: usize) -> bool {
    if changed == 0 {
        warn!("event=repo_call module=repo op={op} status=no_rows id={id}");
    }
    changed > 0
}
