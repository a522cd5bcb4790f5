//! Client-side polling loop.
//!
//! Polling is a cooperative, client-driven loop: read the snapshot, stop on
//! a terminal status, otherwise sleep a bounded interval and read again.
//! Cancellation (the requester navigating away) is an explicit
//! `tokio::sync::watch` signal that stops future polls; it never mutates
//! task state on the server side.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use crate::error::TaskError;
use crate::task::TaskSnapshot;

/// Why a polling loop returned.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// A terminal status (completed or failed) was observed.
    Terminal(TaskSnapshot),
    /// The caller cancelled; the task may still be running server-side.
    Cancelled,
}

/// Poll `fetch` every `interval` until the task is terminal or `cancel`
/// flips to `true`.
///
/// `fetch` is any snapshot-returning operation, typically
/// [`TaskStore::get`] or an HTTP `GET /tasks/{id}` call. Fetch errors
/// propagate immediately: a `NotFound` mid-loop means the caller's id is
/// wrong and retrying will not fix it.
///
/// [`TaskStore::get`]: crate::store::TaskStore::get
pub async fn poll_until_terminal<F, Fut>(
    mut fetch: F,
    interval: Duration,
    mut cancel: watch::Receiver<bool>,
) -> Result<PollOutcome, TaskError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TaskSnapshot, TaskError>>,
{
    loop {
        if *cancel.borrow() {
            return Ok(PollOutcome::Cancelled);
        }

        let snapshot = fetch().await?;
        if snapshot.status.is_terminal() {
            return Ok(PollOutcome::Terminal(snapshot));
        }

        tokio::select! {
            _ = sleep(interval) => {}
            changed = cancel.changed() => {
                // A closed channel means the requester is gone; treat it
                // the same as an explicit cancel.
                if changed.is_err() || *cancel.borrow() {
                    return Ok(PollOutcome::Cancelled);
                }
            }
        }
    }
}
