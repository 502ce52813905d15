//! Bounded-wait execution of backend calls.
//!
//! Every call runs on the tokio blocking pool. The caller waits for at most
//! the configured bound; past that the join handle is detached and the call's
//! `CancelToken` is set. The call itself keeps running until it returns on
//! its own, and whatever it already did stays done.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::services::ports::CancelToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    TimedOut,
    /// The operation panicked; treated like "did not complete".
    Panicked(String),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::TimedOut | Outcome::Panicked(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeoutExecutor {
    in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl TimeoutExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls still running, abandoned ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Must be awaited from inside a tokio runtime with the time driver enabled.
    pub async fn run<T, F>(&self, timeout: Duration, op: F) -> Outcome<T>
    where
        F: FnOnce(&CancelToken) -> T + Send + 'static,
        T: Send + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let in_flight = InFlight(Arc::clone(&self.in_flight));

        let handle = tokio::task::spawn_blocking(move || {
            let _in_flight = in_flight;
            op(&token)
        });

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(value)) => Outcome::Completed(value),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "source control operation panicked");
                Outcome::Panicked(e.to_string())
            }
            Err(_) => {
                cancel.cancel();
                tracing::warn!(
                    timeout_secs = timeout.as_secs_f64(),
                    "source control operation timed out, abandoning it"
                );
                Outcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/sc/executor.rs"]
mod tests;
