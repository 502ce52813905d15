use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOCK_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScSettings {
    /// Seconds a backend call may run before the controller stops waiting.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default = "default_builtin_diff")]
    pub builtin_diff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_program: Option<PathBuf>,
    #[serde(default = "default_lock_poll_interval_ms")]
    pub lock_poll_interval_ms: u64,
    /// Lock polls before a busy node is dropped. Defaults to the timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_retry_limit: Option<u32>,
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

fn default_builtin_diff() -> bool {
    true
}

fn default_lock_poll_interval_ms() -> u64 {
    DEFAULT_LOCK_POLL_INTERVAL_MS
}

impl Default for ScSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            builtin_diff: true,
            diff_program: None,
            lock_poll_interval_ms: DEFAULT_LOCK_POLL_INTERVAL_MS,
            lock_retry_limit: None,
        }
    }
}

impl ScSettings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }

    pub fn lock_retry_limit(&self) -> u32 {
        self.lock_retry_limit
            .unwrap_or_else(|| u32::try_from(self.command_timeout_secs).unwrap_or(u32::MAX))
    }

    /// The external program, unless the built-in view is preferred.
    pub fn external_diff_program(&self) -> Option<&PathBuf> {
        if self.builtin_diff {
            return None;
        }
        self.diff_program.as_ref()
    }
}
