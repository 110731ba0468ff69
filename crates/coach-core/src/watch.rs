//! Focus polling loop.
//!
//! ```text
//! loop {
//!     poll window provider ──► changed? ──► on_change(app)
//!     wait(interval)  ◄── returns early when a StopHandle fires
//! }
//! ```

use crate::window::{active_app_or_unknown, WindowProvider};
use std::cell::Cell;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Stop signal
// ---------------------------------------------------------------------------

/// Sending half; clone it into a Ctrl-C handler or another thread.
#[derive(Debug, Clone)]
pub struct StopHandle(mpsc::Sender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // The receiver being gone means the loop already ended.
        let _ = self.0.send(());
    }
}

/// Receiving half, owned by the loop. Latches once a stop arrives.
#[derive(Debug)]
pub struct StopSignal {
    rx: mpsc::Receiver<()>,
    stopped: Cell<bool>,
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = mpsc::channel();
    (
        StopHandle(tx),
        StopSignal {
            rx,
            stopped: Cell::new(false),
        },
    )
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        if !self.stopped.get() && matches!(self.rx.try_recv(), Ok(())) {
            self.stopped.set(true);
        }
        self.stopped.get()
    }

    /// Block for up to `timeout`. Returns true if a stop was requested.
    ///
    /// With every handle dropped nobody can stop the loop, so this degrades
    /// to a plain sleep.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.stopped.get() {
            return true;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(()) => self.stopped.set(true),
            Err(RecvTimeoutError::Timeout) => {}
            // recv_timeout returns immediately once disconnected.
            Err(RecvTimeoutError::Disconnected) => std::thread::sleep(timeout),
        }
        self.stopped.get()
    }
}

// ---------------------------------------------------------------------------
// FocusWatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FocusWatcher {
    last: Option<String>,
}

impl FocusWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Returns the focused app if it differs from the previous poll. The
    /// first poll always reports. Lookup failures report as `"Unknown"`.
    pub fn poll(&mut self, provider: &dyn WindowProvider) -> Option<String> {
        let current = active_app_or_unknown(provider);
        if self.last.as_deref() == Some(current.as_str()) {
            return None;
        }
        tracing::debug!(from = ?self.last, to = %current, "focus changed");
        self.last = Some(current.clone());
        Some(current)
    }

    /// Poll every `interval` until `stop` fires. Returns the number of
    /// changes reported.
    pub fn run(
        &mut self,
        provider: &dyn WindowProvider,
        interval: Duration,
        stop: &StopSignal,
        mut on_change: impl FnMut(&str),
    ) -> usize {
        let mut changes = 0;
        while !stop.is_stopped() {
            if let Some(app) = self.poll(provider) {
                changes += 1;
                on_change(&app);
            }
            if stop.wait(interval) {
                break;
            }
        }
        tracing::info!(changes, "focus watcher stopped");
        changes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
