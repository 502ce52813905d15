//! 源代码控制运行时配置
//!
//! Persisted settings plus the pieces that only exist at runtime: the backend
//! registry and the host's built-in diff view. One value per controller,
//! shared with the host through `SharedScConfig`.

use std::sync::{Arc, RwLock};

use super::registry::BackendRegistry;
use crate::kernel::services::ports::{DiffRenderer, ScBackend, ScSettings};

pub type SharedScConfig = Arc<RwLock<ScConfig>>;

#[derive(Clone, Default)]
pub struct ScConfig {
    settings: ScSettings,
    systems: BackendRegistry,
    diff_view: Option<Arc<dyn DiffRenderer>>,
}

impl ScConfig {
    pub fn new(settings: ScSettings) -> Self {
        Self {
            settings,
            systems: BackendRegistry::new(),
            diff_view: None,
        }
    }

    pub fn with_backend(mut self, key: impl Into<String>, backend: Arc<dyn ScBackend>) -> Self {
        self.systems.register(key, backend);
        self
    }

    pub fn with_diff_view(mut self, view: Arc<dyn DiffRenderer>) -> Self {
        self.diff_view = Some(view);
        self
    }

    pub fn into_shared(self) -> SharedScConfig {
        Arc::new(RwLock::new(self))
    }

    pub fn settings(&self) -> &ScSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ScSettings {
        &mut self.settings
    }

    pub fn systems(&self) -> &BackendRegistry {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut BackendRegistry {
        &mut self.systems
    }

    pub fn diff_view(&self) -> Option<&Arc<dyn DiffRenderer>> {
        self.diff_view.as_ref()
    }

    pub fn set_diff_view(&mut self, view: Option<Arc<dyn DiffRenderer>>) {
        self.diff_view = view;
    }

    pub fn builtin_diff(&self) -> bool {
        self.settings.builtin_diff
    }

    pub fn set_builtin_diff(&mut self, builtin: bool) {
        self.settings.builtin_diff = builtin;
    }
}

/// Copy of the config taken at the start of one command or diff.
pub(crate) fn snapshot(config: &SharedScConfig) -> ScConfig {
    match config.read() {
        Ok(cfg) => cfg.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
