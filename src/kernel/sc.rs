use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::kernel::services::ports::ScCommandKind;

static NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for a tree entry owned by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new() -> Self {
        Self(NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-node record shared between the host tree and in-flight commands.
///
/// `path` is `None` for synthetic entries (the tree root); those are skipped
/// by the dispatcher.
#[derive(Debug, Default)]
pub struct NodeData {
    path: Option<PathBuf>,
    lock_owner: Mutex<Option<ScCommandKind>>,
}

impl NodeData {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            lock_owner: Mutex::new(None),
        }
    }

    pub fn synthetic() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn lock_owner(&self) -> Option<ScCommandKind> {
        match self.lock_owner.lock() {
            Ok(owner) => *owner,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock_owner().is_some()
    }

    pub(crate) fn lock_slot(&self) -> &Mutex<Option<ScCommandKind>> {
        &self.lock_owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScStatusKind {
    Uptodate,
    Modified,
    Added,
    Deleted,
    Conflicted,
    Untracked,
    Unknown,
}

impl ScStatusKind {
    pub fn marker(self) -> char {
        match self {
            Self::Uptodate => ' ',
            Self::Modified => 'M',
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Conflicted => 'C',
            Self::Untracked => '?',
            Self::Unknown => '!',
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "uptodate" => Self::Uptodate,
            "modified" => Self::Modified,
            "added" => Self::Added,
            "deleted" => Self::Deleted,
            "conflict" | "conflicted" => Self::Conflicted,
            "untracked" => Self::Untracked,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScFileStatus {
    pub kind: ScStatusKind,
    pub revision: Option<String>,
}

impl ScFileStatus {
    pub fn new(kind: ScStatusKind) -> Self {
        Self {
            kind,
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

/// Filled in by a backend's `status` call; keyed by absolute path.
pub type StatusMap = FxHashMap<PathBuf, ScFileStatus>;

#[cfg(test)]
#[path = "../../tests/unit/kernel/sc.rs"]
mod tests;
