//! Version-control backend contract.
//!
//! A backend adapts one control system (svn, git, cvs, ...). The controller
//! only ever talks to it through this trait; commands are a closed set and a
//! backend opts into each one by overriding the matching method.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::runtime::CancelToken;
use crate::kernel::sc::StatusMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScCommandKind {
    Status,
    History,
    Commit,
    Update,
    Revert,
    Add,
    Remove,
}

impl ScCommandKind {
    pub const ALL: [ScCommandKind; 7] = [
        Self::Status,
        Self::History,
        Self::Commit,
        Self::Update,
        Self::Revert,
        Self::Add,
        Self::Remove,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::History => "history",
            Self::Commit => "commit",
            Self::Update => "update",
            Self::Revert => "revert",
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Runs without taking the per-node lock.
    pub fn is_concurrent(self) -> bool {
        matches!(self, Self::Status | Self::History)
    }

    /// Whether the dispatcher refreshes node status after the command.
    pub fn refreshes_status(self) -> bool {
        !matches!(self, Self::History | Self::Revert | Self::Update)
    }

    /// The target may not be tracked yet, so the backend is looked up from
    /// the parent directory when the path itself does not resolve.
    pub fn resolves_from_parent(self) -> bool {
        matches!(self, Self::Add)
    }
}

impl std::fmt::Display for ScCommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub type CommandOptions = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub revision: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommandValue {
    #[default]
    None,
    Text(String),
    History(Vec<HistoryEntry>),
}

/// `Ok(value)` or the backend's error message.
pub type CommandReply = Result<CommandValue, String>;

pub trait ScBackend: Send + Sync {
    fn name(&self) -> &str;

    fn is_controlled(&self, path: &Path) -> bool;

    /// Identifier of the repository `path` belongs to, if it can be determined.
    fn repository(&self, path: &Path) -> Option<String>;

    /// Contents of each path at the given revision/date, or the most recent
    /// stored version when both are `None`. `None` entries mean the content
    /// could not be retrieved.
    fn fetch(&self, paths: &[PathBuf], rev: Option<&str>, date: Option<&str>)
        -> Vec<Option<String>>;

    fn status(&self, paths: &[PathBuf], recursive: bool, status: &mut StatusMap);

    fn commit(
        &self,
        _paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        None
    }

    fn update(
        &self,
        _paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        None
    }

    fn revert(
        &self,
        _paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        None
    }

    fn history(
        &self,
        _paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        None
    }

    fn add(
        &self,
        _paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        None
    }

    fn remove(
        &self,
        _paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        None
    }
}

/// A registered backend: the registry key plus the shared instance.
#[derive(Clone)]
pub struct BackendDescriptor {
    pub key: String,
    pub instance: Arc<dyn ScBackend>,
}

impl BackendDescriptor {
    pub fn new(key: impl Into<String>, instance: Arc<dyn ScBackend>) -> Self {
        Self {
            key: key.into(),
            instance,
        }
    }

    /// Descriptors are equal when they share the same backend instance.
    pub fn same_instance(&self, other: &BackendDescriptor) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl std::fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("key", &self.key)
            .field("backend", &self.instance.name())
            .finish()
    }
}

/// Routes `command` to the backend method implementing it.
///
/// Returns `None` when the backend does not support the command. `Status`
/// always returns `None` here: status is refreshed per node by the
/// dispatcher, not run as a batch command.
pub fn invoke(
    backend: &dyn ScBackend,
    command: ScCommandKind,
    paths: &[PathBuf],
    options: &CommandOptions,
    cancel: &CancelToken,
) -> Option<CommandReply> {
    match command {
        ScCommandKind::Status => None,
        ScCommandKind::History => backend.history(paths, options, cancel),
        ScCommandKind::Commit => backend.commit(paths, options, cancel),
        ScCommandKind::Update => backend.update(paths, options, cancel),
        ScCommandKind::Revert => backend.revert(paths, options, cancel),
        ScCommandKind::Add => backend.add(paths, options, cancel),
        ScCommandKind::Remove => backend.remove(paths, options, cancel),
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/backend.rs"]
mod tests;
