//! Source control adapter: bounded execution, node locks, backend lookup,
//! command dispatch and revision diffs.

pub mod config;
pub mod controller;
pub mod diff;
pub mod executor;
pub mod locks;
pub mod registry;

pub use config::{ScConfig, SharedScConfig};
pub use controller::{CommandCallback, SourceController};
pub use executor::{Outcome, TimeoutExecutor};
pub use locks::{BusyGuard, LockPolicy};
pub use registry::BackendRegistry;
