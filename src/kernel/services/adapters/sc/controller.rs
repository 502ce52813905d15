//! 源代码控制命令调度
//!
//! `SourceController` accepts a batch of tree nodes and a command, works out
//! which backend owns each node, locks the nodes the command may modify, runs
//! the command through the bounded executor, refreshes node status and posts
//! the results to the owner's event bus. `submit` returns immediately; the
//! owner learns about the outcome only through events.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinSet;

use super::config::{snapshot, SharedScConfig};
use super::executor::{Outcome, TimeoutExecutor};
use super::locks::{self, BusyGuard, LockPolicy};
use crate::kernel::sc::{NodeData, NodeId, StatusMap};
use crate::kernel::services::bus::ScEventSender;
use crate::kernel::services::ports::{
    invoke, BackendDescriptor, CommandOptions, CommandReply, CommandValue, DiffRequest,
    RequestId, ScCommandKind, ScErrorCode, ScEvent,
};

/// Receives the backend's reply for each backend group that completed in time.
pub type CommandCallback = Box<dyn FnMut(&CommandReply) + Send + 'static>;

pub struct SourceController {
    runtime: Option<tokio::runtime::Runtime>,
    handle: tokio::runtime::Handle,
    inner: Arc<ControllerInner>,
}

pub(super) struct ControllerInner {
    pub(super) config: SharedScConfig,
    pub(super) events: ScEventSender,
    pub(super) executor: TimeoutExecutor,
    pub(super) tempdir: Mutex<Option<TempDir>>,
    next_request: AtomicU64,
}

struct BatchEntry {
    node: NodeId,
    data: Arc<NodeData>,
    path: PathBuf,
    backend: BackendDescriptor,
}

impl SourceController {
    pub fn new(config: SharedScConfig, events: impl Into<ScEventSender>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sc-worker")
            .enable_all()
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create source control runtime");
                e
            })?;

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            inner: Arc::new(ControllerInner {
                config,
                events: events.into(),
                executor: TimeoutExecutor::new(),
                tempdir: Mutex::new(None),
                next_request: AtomicU64::new(1),
            }),
        })
    }

    pub fn config(&self) -> &SharedScConfig {
        &self.inner.config
    }

    /// Runs `command` on `nodes` in the background.
    ///
    /// Exactly one `ScEvent::CommandComplete` carrying the returned id is
    /// posted once the batch is done, preceded by one `ScEvent::Status` per
    /// refreshed node.
    pub fn submit(
        &self,
        nodes: Vec<(NodeId, Arc<NodeData>)>,
        command: ScCommandKind,
        options: CommandOptions,
        callback: Option<CommandCallback>,
    ) -> RequestId {
        let request = RequestId(self.inner.next_request.fetch_add(1, Ordering::Relaxed));
        let inner = Arc::clone(&self.inner);
        tracing::debug!(request = request.0, %command, nodes = nodes.len(), "submit");

        self.spawn(async move {
            let worker = {
                let inner = Arc::clone(&inner);
                tokio::spawn(async move { inner.run_command(nodes, command, options, callback).await })
            };
            let (command, value) = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(request = request.0, %command, error = %e, "command task failed");
                    (Some(command), None)
                }
            };
            inner.events.post(ScEvent::CommandComplete {
                request,
                command,
                value,
                error: ScErrorCode::None,
            });
        });

        request
    }

    /// Posts one `ScEvent::Status` for the node. Nothing is posted when no
    /// backend controls the node's path.
    pub fn refresh_status(&self, node: NodeId, data: Arc<NodeData>, recursive: bool) {
        let inner = Arc::clone(&self.inner);
        self.spawn(async move {
            let Some(path) = data.path().map(Path::to_path_buf) else {
                return;
            };
            let config = snapshot(&inner.config);
            let Some(backend) = config.systems().resolve_for(&path, ScCommandKind::Status) else {
                tracing::debug!(path = %path.display(), "status: path not under source control");
                return;
            };
            let timeout = config.settings().command_timeout();
            inner
                .status_with_timeout(node, data, path, backend, recursive, timeout)
                .await;
        });
    }

    /// Compares a file against stored revisions in the background and posts
    /// `ScEvent::DiffComplete`. Directories fan out to one comparison per file.
    pub fn compare_revisions(&self, request: DiffRequest) {
        ControllerInner::spawn_diff(&self.inner, &self.handle, request);
    }

    pub fn get_sc_system(&self, path: &Path) -> Option<BackendDescriptor> {
        snapshot(&self.inner.config).systems().resolve(path)
    }

    pub fn is_single_repository(&self, paths: &[PathBuf]) -> bool {
        snapshot(&self.inner.config)
            .systems()
            .is_single_repository(paths)
    }

    /// Directory holding materialized revisions, once the first diff created it.
    pub fn temp_dir(&self) -> Option<PathBuf> {
        match self.inner.tempdir.lock() {
            Ok(dir) => dir.as_ref().map(|d| d.path().to_path_buf()),
            Err(poisoned) => poisoned.into_inner().as_ref().map(|d| d.path().to_path_buf()),
        }
    }

    /// Removes the temporary directory and everything written to it.
    pub fn cleanup(&self) {
        let dir = match self.inner.tempdir.lock() {
            Ok(mut dir) => dir.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(dir) = dir {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove diff temp dir");
            }
        }
    }

    /// Backend calls still running, including abandoned ones.
    pub fn in_flight(&self) -> usize {
        self.inner.executor.in_flight()
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task);
    }
}

impl Drop for SourceController {
    fn drop(&mut self) {
        self.cleanup();
        let abandoned = self.inner.executor.in_flight();
        if abandoned > 0 {
            tracing::warn!(abandoned, "source controller dropped with operations still running");
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl ControllerInner {
    async fn run_command(
        self: &Arc<Self>,
        nodes: Vec<(NodeId, Arc<NodeData>)>,
        command: ScCommandKind,
        options: CommandOptions,
        mut callback: Option<CommandCallback>,
    ) -> (Option<ScCommandKind>, Option<CommandValue>) {
        let config = snapshot(&self.config);
        let timeout = config.settings().command_timeout();

        let mut batch: Vec<BatchEntry> = Vec::with_capacity(nodes.len());
        for (node, data) in nodes {
            if batch.iter().any(|e| Arc::ptr_eq(&e.data, &data)) {
                continue;
            }
            let Some(path) = data.path().map(Path::to_path_buf) else {
                tracing::debug!(node = node.raw(), "skipping node without a path");
                continue;
            };
            let Some(backend) = config.systems().resolve_for(&path, command) else {
                tracing::debug!(path = %path.display(), %command, "no backend controls path, dropped");
                continue;
            };
            batch.push(BatchEntry {
                node,
                data,
                path,
                backend,
            });
        }

        if batch.is_empty() {
            return (None, None);
        }

        let mut guards: Vec<BusyGuard> = Vec::new();
        if !command.is_concurrent() {
            let policy = LockPolicy::from_settings(config.settings());
            let mut locked = Vec::with_capacity(batch.len());
            for entry in batch {
                match locks::acquire(&entry.data, command, &policy).await {
                    Some(guard) => {
                        guards.push(guard);
                        locked.push(entry);
                    }
                    None => {
                        tracing::warn!(
                            path = %entry.path.display(),
                            %command,
                            holder = ?entry.data.lock_owner(),
                            "node still busy, dropped from batch"
                        );
                    }
                }
            }
            batch = locked;
        }

        let mut value = None;
        let mut refresh = Vec::new();
        for (backend, entries) in group_by_backend(batch) {
            // unfinished groups keep their current status
            let completed = if command == ScCommandKind::Status {
                true
            } else {
                let paths: Vec<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();
                let instance = Arc::clone(&backend.instance);
                let opts = options.clone();
                let outcome = self
                    .executor
                    .run(timeout, move |cancel| {
                        invoke(instance.as_ref(), command, &paths, &opts, cancel)
                    })
                    .await;
                match outcome {
                    Outcome::Completed(Some(reply)) => {
                        if let Err(msg) = &reply {
                            tracing::warn!(backend = %backend.key, %command, error = %msg, "command reported an error");
                        }
                        if let Some(cb) = callback.as_mut() {
                            cb(&reply);
                        }
                        value = reply.ok();
                        true
                    }
                    Outcome::Completed(None) => {
                        tracing::debug!(backend = %backend.key, %command, "command not supported by backend");
                        true
                    }
                    Outcome::TimedOut | Outcome::Panicked(_) => {
                        tracing::warn!(
                            backend = %backend.key,
                            %command,
                            nodes = entries.len(),
                            "command did not complete, skipping status refresh"
                        );
                        false
                    }
                }
            };

            if completed && command.refreshes_status() {
                refresh.extend(entries);
            }
        }

        let mut refreshes = JoinSet::new();
        for entry in refresh {
            let inner = Arc::clone(self);
            refreshes.spawn(async move {
                inner
                    .status_with_timeout(entry.node, entry.data, entry.path, entry.backend, false, timeout)
                    .await;
            });
        }
        while let Some(res) = refreshes.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "status refresh task failed");
            }
        }

        drop(guards);
        (Some(command), value)
    }

    /// Runs the backend's status call for one node and posts the result.
    /// A timed out call still posts an event, with an empty map.
    pub(super) async fn status_with_timeout(
        &self,
        node: NodeId,
        data: Arc<NodeData>,
        path: PathBuf,
        backend: BackendDescriptor,
        recursive: bool,
        timeout: Duration,
    ) {
        let instance = Arc::clone(&backend.instance);
        let paths = vec![path];
        let outcome = self
            .executor
            .run(timeout, move |_cancel| {
                let mut status = StatusMap::default();
                instance.status(&paths, recursive, &mut status);
                status
            })
            .await;

        let status = outcome.completed().unwrap_or_else(|| {
            tracing::warn!(node = node.raw(), backend = %backend.key, "status refresh did not complete");
            StatusMap::default()
        });

        self.events.post(ScEvent::Status {
            node,
            data,
            status,
            backend,
        });
    }
}

fn group_by_backend(batch: Vec<BatchEntry>) -> Vec<(BackendDescriptor, Vec<BatchEntry>)> {
    let mut groups: Vec<(BackendDescriptor, Vec<BatchEntry>)> = Vec::new();
    for entry in batch {
        match groups
            .iter_mut()
            .find(|(backend, _)| backend.same_instance(&entry.backend))
        {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((entry.backend.clone(), vec![entry])),
        }
    }
    groups
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/sc/controller.rs"]
mod tests;
