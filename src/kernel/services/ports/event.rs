use std::path::PathBuf;
use std::sync::Arc;

use super::backend::{BackendDescriptor, CommandValue, ScCommandKind};
use super::diff::DiffArtifact;
use crate::kernel::sc::{NodeData, NodeId, StatusMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ScErrorCode {
    #[default]
    None = 0,
    RetrievalFail = 1,
}

impl ScErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_error(self) -> bool {
        self != Self::None
    }
}

/// Correlates a `submit` call with its terminal `CommandComplete` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone)]
pub enum ScEvent {
    /// Posted exactly once per `submit`. `command` is `None` when the batch
    /// resolved to no backend at all.
    CommandComplete {
        request: RequestId,
        command: Option<ScCommandKind>,
        value: Option<CommandValue>,
        error: ScErrorCode,
    },
    Status {
        node: NodeId,
        data: Arc<NodeData>,
        status: StatusMap,
        backend: BackendDescriptor,
    },
    DiffComplete {
        path: PathBuf,
        artifacts: Vec<DiffArtifact>,
        error: ScErrorCode,
    },
}

impl ScEvent {
    pub fn error(&self) -> ScErrorCode {
        match self {
            ScEvent::CommandComplete { error, .. } | ScEvent::DiffComplete { error, .. } => *error,
            ScEvent::Status { .. } => ScErrorCode::None,
        }
    }
}
