//! Cooperative cancellation for running sessions.

use tokio::sync::watch;
use tokio::time::Instant;

/// Observed by a session on every poll tick.
///
/// A signal trips when its [`CancelHandle`] fires or its deadline passes.
/// The default signal never trips.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Fires the paired [`CancelSignal`] and all of its clones.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelSignal {
    /// Create a signal and the handle that trips it.
    pub fn new() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            CancelSignal {
                flag: Some(rx),
                deadline: None,
            },
        )
    }

    /// Also trip at `deadline`; the earlier of two deadlines wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the session should stop.
    pub fn is_cancelled(&self) -> bool {
        self.flag.as_ref().is_some_and(|rx| *rx.borrow())
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl CancelHandle {
    /// Trip the signal.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
