//! Per-node advisory locks.
//!
//! The lock lives on `NodeData` itself. A non-concurrent command marks every
//! node of its batch busy before running and clears the mark when it is done;
//! `BusyGuard` does the clearing so no exit path can leave a node marked.

use std::sync::Arc;
use std::time::Duration;

use crate::kernel::sc::NodeData;
use crate::kernel::services::ports::{ScCommandKind, ScSettings};

/// Sets `lock_owner` to `command` if the node is free.
pub fn try_mark_busy(data: &NodeData, command: ScCommandKind) -> bool {
    let mut owner = match data.lock_slot().lock() {
        Ok(owner) => owner,
        Err(poisoned) => poisoned.into_inner(),
    };
    if owner.is_some() {
        return false;
    }
    *owner = Some(command);
    true
}

pub fn clear_busy(data: &NodeData) {
    let mut owner = match data.lock_slot().lock() {
        Ok(owner) => owner,
        Err(poisoned) => poisoned.into_inner(),
    };
    *owner = None;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    pub poll_interval: Duration,
    pub retry_limit: u32,
}

impl LockPolicy {
    pub fn from_settings(settings: &ScSettings) -> Self {
        Self {
            poll_interval: settings.lock_poll_interval(),
            retry_limit: settings.lock_retry_limit(),
        }
    }
}

/// Clears the node's lock when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    data: Arc<NodeData>,
}

impl BusyGuard {
    pub fn data(&self) -> &Arc<NodeData> {
        &self.data
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        clear_busy(&self.data);
    }
}

/// Marks the node busy, polling while another command holds it.
///
/// Gives up with `None` after `retry_limit` polls.
pub async fn acquire(
    data: &Arc<NodeData>,
    command: ScCommandKind,
    policy: &LockPolicy,
) -> Option<BusyGuard> {
    let mut attempts = 0u32;
    loop {
        if try_mark_busy(data, command) {
            return Some(BusyGuard {
                data: Arc::clone(data),
            });
        }
        if attempts >= policy.retry_limit {
            return None;
        }
        attempts += 1;
        tracing::debug!(
            path = ?data.path(),
            holder = ?data.lock_owner(),
            attempt = attempts,
            "node busy, waiting"
        );
        tokio::time::sleep(policy.poll_interval).await;
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/sc/locks.rs"]
mod tests;
