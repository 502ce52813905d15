#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use sccontrol::kernel::services::ports::{
    CancelToken, CommandOptions, CommandReply, CommandValue, HistoryEntry, ScSettings,
};
use sccontrol::kernel::{ScFileStatus, ScStatusKind, StatusMap};
use sccontrol::{
    sc_event_bus, ScBackend, ScCommandKind, ScConfig, ScEvent, ScEventReceiver, SourceController,
};

/// Controls everything below `root`. Revisions are looked up by selector
/// (`rev`, then `date`, then `"previous"`), whatever the path.
pub struct FakeBackend {
    root: PathBuf,
    delay: Duration,
    revisions: FxHashMap<String, String>,
    calls: Mutex<Vec<(ScCommandKind, Vec<PathBuf>)>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl FakeBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delay: Duration::ZERO,
            revisions: FxHashMap::default(),
            calls: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_revision(mut self, selector: &str, content: &str) -> Self {
        self.revisions
            .insert(selector.to_string(), content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(ScCommandKind, Vec<PathBuf>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    fn run(&self, command: ScCommandKind, paths: &[PathBuf]) -> CommandReply {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((command, paths.to_vec()));
        }
        std::thread::sleep(self.delay);
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(CommandValue::Text(format!("{} {}", command, paths.len())))
    }
}

impl ScBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_controlled(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    fn repository(&self, _path: &Path) -> Option<String> {
        Some(self.root.display().to_string())
    }

    fn fetch(
        &self,
        paths: &[PathBuf],
        rev: Option<&str>,
        date: Option<&str>,
    ) -> Vec<Option<String>> {
        let key = rev.or(date).unwrap_or("previous");
        paths
            .iter()
            .map(|_| self.revisions.get(key).cloned())
            .collect()
    }

    fn status(&self, paths: &[PathBuf], _recursive: bool, status: &mut StatusMap) {
        for path in paths {
            status.insert(path.clone(), ScFileStatus::new(ScStatusKind::Modified));
        }
    }

    fn commit(
        &self,
        paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        Some(self.run(ScCommandKind::Commit, paths))
    }

    fn update(
        &self,
        paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        Some(self.run(ScCommandKind::Update, paths))
    }

    fn history(
        &self,
        paths: &[PathBuf],
        _options: &CommandOptions,
        _cancel: &CancelToken,
    ) -> Option<CommandReply> {
        let reply = self.run(ScCommandKind::History, paths).map(|_| {
            CommandValue::History(vec![HistoryEntry {
                revision: "2".to_string(),
                author: "dev".to_string(),
                date: "2024-01-02".to_string(),
                message: "second".to_string(),
            }])
        });
        Some(reply)
    }
}

pub fn settings(timeout_secs: u64) -> ScSettings {
    ScSettings {
        command_timeout_secs: timeout_secs,
        lock_poll_interval_ms: 20,
        lock_retry_limit: Some(200),
        ..ScSettings::default()
    }
}

pub fn controller(config: ScConfig) -> (SourceController, ScEventReceiver) {
    let (tx, rx) = sc_event_bus();
    let controller = SourceController::new(config.into_shared(), tx).unwrap();
    (controller, rx)
}

pub fn config_with(backend: Arc<FakeBackend>, settings: ScSettings) -> ScConfig {
    ScConfig::new(settings).with_backend("fake", backend)
}

/// Events up to and including the `n`th `CommandComplete`.
pub fn until_complete(rx: &mut ScEventReceiver, n: usize, timeout: Duration) -> Vec<ScEvent> {
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    let mut complete = 0;
    while complete < n {
        let left = deadline.saturating_duration_since(Instant::now());
        let event = rx
            .recv_timeout(left)
            .unwrap_or_else(|_| panic!("timed out after {} events", events.len()));
        if matches!(event, ScEvent::CommandComplete { .. }) {
            complete += 1;
        }
        events.push(event);
    }
    events
}

/// Every event posted within `window`.
pub fn collect_for(rx: &mut ScEventReceiver, window: Duration) -> Vec<ScEvent> {
    let deadline = Instant::now() + window;
    let mut events = Vec::new();
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        match rx.recv_timeout(left) {
            Ok(event) => events.push(event),
            Err(_) => break,
        }
    }
    events
}
