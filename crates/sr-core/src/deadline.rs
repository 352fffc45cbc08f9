//! Deadline-bounded execution of blocking upstream calls.
//!
//! The road-data fetch and the batch inference call are the only places a
//! planning request blocks on something it does not control.  Both go through
//! [`run_bounded`], which runs the job on a helper thread and waits for at
//! most `timeout`, polling the request's [`CancelToken`] while it waits.
//!
//! When the wait ends early the helper thread is detached.  Its result, if it
//! ever arrives, is dropped with the channel.  Jobs must own their
//! inputs and must not write into shared state.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::CancelToken;

/// How often a waiting caller re-checks its cancellation token.
const POLL_SLICE: Duration = Duration::from_millis(20);

/// Why a bounded job produced no value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Interrupted {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("cancelled by caller")]
    Cancelled,

    #[error("worker panicked before producing a result")]
    Panicked,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

/// Run `job` on a named helper thread and wait up to `timeout` for its result.
pub fn run_bounded<T, F>(
    name: &str,
    timeout: Duration,
    cancel: &CancelToken,
    job: F,
) -> Result<T, Interrupted>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(Interrupted::Cancelled);
    }

    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name(format!("sr-{name}"))
        .spawn(move || {
            // Receiver may be gone after a timeout; that is fine.
            let _ = tx.send(job());
        })
        .map_err(|e| Interrupted::Spawn(e.to_string()))?;

    // `None` when the timeout is too large to represent: wait without a deadline.
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(Interrupted::TimedOut(timeout));
                }
                (deadline - now).min(POLL_SLICE)
            }
            None => POLL_SLICE,
        };
        match rx.recv_timeout(slice) {
            Ok(value) => return Ok(value),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Err(Interrupted::Panicked),
        }
    }
}
