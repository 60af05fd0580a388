//! Progress reporting for one install attempt.
//!
//! Progress values carry no correctness semantics; they exist purely for UI
//! feedback. The single invariant is monotonic non-decrease within an
//! attempt, which `ProgressState` enforces regardless of what checkpoint the
//! caller hands it.

use tokio::sync::mpsc;

/// Monotonically non-decreasing progress value in `[0, 100]`, owned
/// exclusively by the orchestrator.
#[derive(Debug, Default)]
pub struct ProgressState {
    value: u8,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `checkpoint` and return the resulting value. Checkpoints
    /// at or below the current value are ignored, values above 100 clamp.
    pub fn advance(&mut self, checkpoint: u8) -> u8 {
        self.value = self.value.max(checkpoint.min(100));
        self.value
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

/// Events the install task sends to the presentation layer.
#[derive(Debug, Clone)]
pub enum InstallEvent {
    /// Progress checkpoint reached.
    Progress(u8),
    /// Outcome of the detached shortcut task. Non-fatal; reported on its own
    /// so the UI can show a warning without touching the main sequence.
    ShortcutResult(Result<(), String>),
}

pub type EventSender = mpsc::Sender<InstallEvent>;
pub type EventReceiver = mpsc::Receiver<InstallEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::channel(64)
}
