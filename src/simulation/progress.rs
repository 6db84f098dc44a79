//! Progress reporting and cooperative cancellation for season workers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Receives the 1-based count of completed games after every game.
/// Implementations must not block the simulation worker.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, completed_games: usize);
}

impl ProgressSink for mpsc::UnboundedSender<usize> {
    fn on_progress(&self, completed_games: usize) {
        // receiver may be gone; progress is fire-and-forget
        let _ = self.send(completed_games);
    }
}

/// Progress sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _completed_games: usize) {}
}

/// Shared flag checked by the simulator between games
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
