//! Service adapters: runtime specific implementations (threads, timers, files).

pub mod sc;
pub mod settings;

pub use sc::{
    BackendRegistry, CommandCallback, Outcome, ScConfig, SharedScConfig, SourceController,
    TimeoutExecutor,
};
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from, SettingsError,
};
