use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use super::ports::ScEvent;

/// Sending half handed to the controller; events may be posted from any
/// worker thread.
#[derive(Clone)]
pub struct ScEventSender {
    tx: Sender<ScEvent>,
}

/// Receiving half drained by the owning window on its own thread.
pub struct ScEventReceiver {
    rx: Receiver<ScEvent>,
}

pub fn sc_event_bus() -> (ScEventSender, ScEventReceiver) {
    let (tx, rx) = mpsc::channel();
    (ScEventSender { tx }, ScEventReceiver { rx })
}

impl ScEventSender {
    pub fn post(&self, event: ScEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("source control event dropped: receiver closed");
        }
    }
}

impl From<Sender<ScEvent>> for ScEventSender {
    fn from(tx: Sender<ScEvent>) -> Self {
        Self { tx }
    }
}

impl ScEventReceiver {
    pub fn try_recv(&mut self) -> Result<ScEvent, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<ScEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn drain(&mut self) -> Vec<ScEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            out.push(event);
        }
        out
    }
}
