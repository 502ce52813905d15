//! Source control kernel: node model, commit message history and the
//! services that run version-control commands.

pub mod commit_history;
pub mod sc;
pub mod services;

pub use commit_history::RecentMessages;
pub use sc::{NodeData, NodeId, ScFileStatus, ScStatusKind, StatusMap};
