use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, DiffError>;

#[derive(Debug)]
pub enum DiffError {
    Io(io::Error),
    /// Neither side of the comparison could be materialized.
    NothingToCompare,
    /// The configured external program could not be started.
    ProgramFailed { program: PathBuf, message: String },
    Renderer(String),
}

impl std::fmt::Display for DiffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffError::Io(e) => write!(f, "IO error: {}", e),
            DiffError::NothingToCompare => write!(f, "Nothing to compare"),
            DiffError::ProgramFailed { program, message } => {
                write!(f, "Diff program {} failed: {}", program.display(), message)
            }
            DiffError::Renderer(msg) => write!(f, "Diff renderer failed: {}", msg),
        }
    }
}

impl std::error::Error for DiffError {}

impl From<io::Error> for DiffError {
    fn from(e: io::Error) -> Self {
        DiffError::Io(e)
    }
}

/// A revision written to the controller's temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffArtifact {
    pub path: PathBuf,
    pub label: String,
}

/// Built-in comparison view supplied by the host (HTML diff window etc).
///
/// `left` is always a fetched revision. `right` is the working copy, or the
/// first revision when two were requested.
pub trait DiffRenderer: Send + Sync {
    fn render(&self, left: &Path, right: &Path) -> Result<()>;
}

/// What to compare: the working copy against a stored revision, or two
/// stored revisions. A revision wins over a date on the same side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffRequest {
    pub path: PathBuf,
    pub rev1: Option<String>,
    pub date1: Option<String>,
    pub rev2: Option<String>,
    pub date2: Option<String>,
}

impl DiffRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn rev1(mut self, rev: impl Into<String>) -> Self {
        self.rev1 = Some(rev.into());
        self
    }

    pub fn date1(mut self, date: impl Into<String>) -> Self {
        self.date1 = Some(date.into());
        self
    }

    pub fn rev2(mut self, rev: impl Into<String>) -> Self {
        self.rev2 = Some(rev.into());
        self
    }

    pub fn date2(mut self, date: impl Into<String>) -> Self {
        self.date2 = Some(date.into());
        self
    }

    /// Same revision selectors, different path.
    pub fn for_path(&self, path: PathBuf) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }

    pub fn has_selectors(&self) -> bool {
        self.rev1.is_some() || self.date1.is_some() || self.rev2.is_some() || self.date2.is_some()
    }
}
