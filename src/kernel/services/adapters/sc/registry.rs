use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::services::ports::{BackendDescriptor, ScBackend, ScCommandKind};

/// Ordered set of backends; the first one that controls a path wins.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    systems: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a backend, or replaces the one registered under `key` in place.
    pub fn register(&mut self, key: impl Into<String>, backend: Arc<dyn ScBackend>) {
        let descriptor = BackendDescriptor::new(key, backend);
        match self.systems.iter_mut().find(|d| d.key == descriptor.key) {
            Some(existing) => *existing = descriptor,
            None => self.systems.push(descriptor),
        }
    }

    pub fn unregister(&mut self, key: &str) -> Option<BackendDescriptor> {
        let idx = self.systems.iter().position(|d| d.key == key)?;
        Some(self.systems.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|d| d.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.systems.iter()
    }

    pub fn resolve(&self, path: &Path) -> Option<BackendDescriptor> {
        self.systems
            .iter()
            .find(|d| d.instance.is_controlled(path))
            .cloned()
    }

    /// `resolve` plus the parent-directory fallback the dispatcher uses:
    /// directories are often not controlled themselves while their contents
    /// are, and `add` targets are not tracked yet.
    pub fn resolve_for(&self, path: &Path, command: ScCommandKind) -> Option<BackendDescriptor> {
        if let Some(found) = self.resolve(path) {
            return Some(found);
        }
        if !(path.is_dir() || command.resolves_from_parent()) {
            return None;
        }
        let parent = path.parent()?;
        self.resolve(parent)
    }

    /// True when every resolvable path reports the same repository.
    ///
    /// Paths without a backend, or whose backend cannot name the repository,
    /// are skipped rather than counted as a mismatch.
    pub fn is_single_repository(&self, paths: &[PathBuf]) -> bool {
        let mut previous: Option<String> = None;
        for path in paths {
            let Some(repo) = self
                .resolve(path)
                .and_then(|d| d.instance.repository(path))
            else {
                continue;
            };
            match &previous {
                None => previous = Some(repo),
                Some(prev) if *prev != repo => return false,
                Some(_) => {}
            }
        }
        true
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.systems.iter()).finish()
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/sc/registry.rs"]
mod tests;
