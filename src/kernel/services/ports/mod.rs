//! Service ports: traits + data contracts.

pub mod backend;
pub mod diff;
pub mod event;
pub mod runtime;
pub mod settings;

pub use backend::{
    invoke, BackendDescriptor, CommandOptions, CommandReply, CommandValue, HistoryEntry,
    ScBackend, ScCommandKind,
};
pub use diff::{DiffArtifact, DiffError, DiffRenderer, DiffRequest};
pub use event::{RequestId, ScErrorCode, ScEvent};
pub use runtime::CancelToken;
pub use settings::ScSettings;
