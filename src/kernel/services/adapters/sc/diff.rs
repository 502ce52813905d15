//! Revision comparison.
//!
//! Fetches one or two stored revisions of a file, writes them into the
//! controller's temporary directory as `<basename>.<label>` and hands the
//! pair to the comparison view: the host's built-in view, or the configured
//! external diff program.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::{snapshot, ScConfig};
use super::controller::ControllerInner;
use crate::kernel::services::ports::diff::Result as DiffResult;
use crate::kernel::services::ports::{
    BackendDescriptor, DiffArtifact, DiffError, DiffRequest, ScErrorCode, ScEvent,
};

const PREVIOUS_LABEL: &str = "previous";

/// One side of the comparison that was fetched from the backend.
struct Fetched {
    content: String,
    label: String,
}

impl ControllerInner {
    pub(super) fn spawn_diff(
        inner: &Arc<Self>,
        handle: &tokio::runtime::Handle,
        request: DiffRequest,
    ) {
        let inner = Arc::clone(inner);
        let child_handle = handle.clone();
        handle.spawn(async move {
            if tokio::fs::metadata(&request.path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false)
            {
                for child in list_files(&request.path).await {
                    Self::spawn_diff(&inner, &child_handle, request.for_path(child));
                }
                return;
            }

            let Some((artifacts, error)) = inner.diff(&request).await else {
                return;
            };
            inner.events.post(ScEvent::DiffComplete {
                path: request.path,
                artifacts,
                error,
            });
        });
    }

    /// `None` means the path is not under source control: nothing is posted.
    async fn diff(&self, request: &DiffRequest) -> Option<(Vec<DiffArtifact>, ScErrorCode)> {
        let config = snapshot(&self.config);
        let Some(backend) = config.systems().resolve(&request.path) else {
            tracing::debug!(path = %request.path.display(), "diff: path not under source control");
            return None;
        };

        let first = match side(request.rev1.as_deref(), request.date1.as_deref()) {
            Some(sel) => match self.fetch(&config, &backend, &request.path, sel).await {
                Some(fetched) => Some(fetched),
                None => return Some((Vec::new(), ScErrorCode::RetrievalFail)),
            },
            None => None,
        };
        let second = match side(request.rev2.as_deref(), request.date2.as_deref()) {
            Some(sel) => match self.fetch(&config, &backend, &request.path, sel).await {
                Some(fetched) => Some(fetched),
                None => return Some((Vec::new(), ScErrorCode::RetrievalFail)),
            },
            None => None,
        };
        let first = if request.has_selectors() {
            first
        } else {
            match self
                .fetch(&config, &backend, &request.path, Selector::Previous)
                .await
            {
                Some(fetched) => Some(fetched),
                None => return Some((Vec::new(), ScErrorCode::RetrievalFail)),
            }
        };

        match self.materialize(&request.path, first, second).await {
            Ok((artifacts, left, right)) => {
                let error = match show(&config, &left, &right).await {
                    Ok(()) => ScErrorCode::None,
                    Err(e) => {
                        tracing::warn!(path = %request.path.display(), error = %e, "diff could not be shown");
                        ScErrorCode::RetrievalFail
                    }
                };
                Some((artifacts, error))
            }
            Err(e) => {
                tracing::warn!(path = %request.path.display(), error = %e, "diff could not be prepared");
                Some((Vec::new(), ScErrorCode::RetrievalFail))
            }
        }
    }

    async fn fetch(
        &self,
        config: &ScConfig,
        backend: &BackendDescriptor,
        path: &Path,
        selector: Selector<'_>,
    ) -> Option<Fetched> {
        let (rev, date) = match selector {
            Selector::Rev(rev) => (Some(rev.to_string()), None),
            Selector::Date(date) => (None, Some(date.to_string())),
            Selector::Previous => (None, None),
        };
        let label = selector.label();
        let instance = Arc::clone(&backend.instance);
        let paths = vec![path.to_path_buf()];
        let outcome = self
            .executor
            .run(config.settings().command_timeout(), move |_cancel| {
                instance.fetch(&paths, rev.as_deref(), date.as_deref())
            })
            .await;

        let content = outcome
            .completed()
            .and_then(|contents| contents.into_iter().next())
            .flatten();
        match content {
            Some(content) => Some(Fetched { content, label }),
            None => {
                tracing::warn!(path = %path.display(), revision = %label, "failed to retrieve revision");
                None
            }
        }
    }

    /// Writes fetched revisions and returns them with the `(left, right)`
    /// pair to compare.
    async fn materialize(
        &self,
        path: &Path,
        first: Option<Fetched>,
        second: Option<Fetched>,
    ) -> DiffResult<(Vec<DiffArtifact>, PathBuf, PathBuf)> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(DiffError::NothingToCompare)?;
        let dir = self.temp_dir()?;

        match (first, second) {
            (Some(first), Some(second)) => {
                let a = write_revision(&dir, &file_name, &first).await?;
                let b = write_revision(&dir, &file_name, &second).await?;
                let (left, right) = (b.path.clone(), a.path.clone());
                Ok((vec![a, b], left, right))
            }
            (Some(only), None) | (None, Some(only)) => {
                let a = write_revision(&dir, &file_name, &only).await?;
                let left = a.path.clone();
                Ok((vec![a], left, path.to_path_buf()))
            }
            (None, None) => Err(DiffError::NothingToCompare),
        }
    }

    /// Creates the temporary directory on first use.
    fn temp_dir(&self) -> DiffResult<PathBuf> {
        let mut slot = match self.tempdir.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(dir) = slot.as_ref() {
            return Ok(dir.path().to_path_buf());
        }
        let dir = tempfile::Builder::new().prefix("sccontrol-").tempdir()?;
        let path = dir.path().to_path_buf();
        tracing::debug!(path = %path.display(), "created diff temp dir");
        *slot = Some(dir);
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy)]
enum Selector<'a> {
    Rev(&'a str),
    Date(&'a str),
    Previous,
}

impl Selector<'_> {
    fn label(&self) -> String {
        match self {
            Selector::Rev(s) | Selector::Date(s) => sanitize_label(s),
            Selector::Previous => PREVIOUS_LABEL.to_string(),
        }
    }
}

fn side<'a>(rev: Option<&'a str>, date: Option<&'a str>) -> Option<Selector<'a>> {
    match (rev, date) {
        (Some(rev), _) => Some(Selector::Rev(rev)),
        (None, Some(date)) => Some(Selector::Date(date)),
        (None, None) => None,
    }
}

/// Labels end up in file names.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' => '_',
            ch => ch,
        })
        .collect()
}

pub fn artifact_path(dir: &Path, file_name: &str, label: &str) -> PathBuf {
    dir.join(format!("{}.{}", file_name, label))
}

async fn write_revision(dir: &Path, file_name: &str, fetched: &Fetched) -> DiffResult<DiffArtifact> {
    let path = artifact_path(dir, file_name, &fetched.label);
    tokio::fs::write(&path, fetched.content.as_bytes()).await?;
    Ok(DiffArtifact {
        path,
        label: fetched.label.clone(),
    })
}

/// Immediate children that are files; sub-directories are not descended into.
async fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "diff: failed to list directory");
            return out;
        }
    };
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "diff: failed to list directory");
                break;
            }
        };
        if let Ok(file_type) = entry.file_type().await {
            if file_type.is_file() {
                out.push(entry.path());
            }
        }
    }
    out.sort();
    out
}

async fn show(config: &ScConfig, left: &Path, right: &Path) -> DiffResult<()> {
    if let Some(program) = config.settings().external_diff_program() {
        return run_diff_program(program, left, right).await;
    }

    let Some(view) = config.diff_view().cloned() else {
        return Err(DiffError::Renderer("no diff view available".to_string()));
    };
    let left = left.to_path_buf();
    let right = right.to_path_buf();
    tokio::task::spawn_blocking(move || view.render(&left, &right))
        .await
        .map_err(|e| DiffError::Renderer(e.to_string()))?
}

async fn run_diff_program(program: &Path, left: &Path, right: &Path) -> DiffResult<()> {
    let status = tokio::process::Command::new(program)
        .arg(left)
        .arg(right)
        .status()
        .await
        .map_err(|e| DiffError::ProgramFailed {
            program: program.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::debug!(program = %program.display(), ?status, "diff program exited");
    Ok(())
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/sc/diff.rs"]
mod tests;
