//! Worker thread lifecycle
//!
//! Every module runs its loop on one dedicated thread owned by a
//! [`WorkerThread`]. The loop body receives a [`RunFlag`] and is expected to
//! check it at each iteration boundary; blocking queue calls are bounded by
//! a timeout, so a cleared flag is observed within one timeout interval.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted ──start()──► Running ──stop()──► StopRequested ──join──► Stopped
//!                            ▲                                          │
//!                            └──────────────────start()─────────────────┘
//! ```
//!
//! - `start()` while running is rejected with
//!   [`PipelineError::AlreadyRunning`]; the running loop is left alone.
//! - `stop()` clears the flag, joins the thread and hands back whatever the
//!   loop body returned. Calling it again is a no-op.

use crate::error::{PipelineError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    NotStarted,
    Running,
    StopRequested,
    Stopped,
}

/// Shared running flag handed to a loop body
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// Create a cleared flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the loop should keep going
    #[inline]
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, running: bool) {
        self.0.store(running, Ordering::SeqCst);
    }

    /// Sleep for `total`, waking every `step` to check the flag
    ///
    /// Returns `false` if the flag was cleared before the full duration
    /// elapsed.
    pub fn sleep(&self, total: Duration, step: Duration) -> bool {
        let step = step.max(Duration::from_millis(1));
        let deadline = Instant::now() + total;
        loop {
            if !self.is_running() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(step.min(deadline - now));
        }
    }
}

/// A single background thread with cooperative start/stop
///
/// `R` is the value the loop body returns when it exits, typically the
/// counters of that run.
pub struct WorkerThread<R> {
    name: String,
    running: RunFlag,
    state: WorkerState,
    handle: Option<JoinHandle<R>>,
}

impl<R: Send + 'static> WorkerThread<R> {
    /// Create an idle worker; `name` is used for the OS thread name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: RunFlag::new(),
            state: WorkerState::NotStarted,
            handle: None,
        }
    }

    /// Spawn the loop body on a new thread
    pub fn start<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(RunFlag) -> R + Send + 'static,
    {
        if self.handle.is_some() {
            return Err(PipelineError::AlreadyRunning(self.name.clone()));
        }

        self.running.set(true);
        let flag = self.running.clone();
        let spawned = std::thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || body(flag));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = WorkerState::Running;
                tracing::trace!("{}: worker thread spawned", self.name);
                Ok(())
            }
            Err(e) => {
                self.running.set(false);
                Err(PipelineError::from(e).with_context(format!(
                    "Failed to spawn worker thread for '{}'",
                    self.name
                )))
            }
        }
    }

    /// Signal the loop to exit and wait for it
    ///
    /// Returns `Ok(None)` when nothing was running.
    pub fn stop(&mut self) -> Result<Option<R>> {
        let Some(handle) = self.handle.take() else {
            return Ok(None);
        };

        self.state = WorkerState::StopRequested;
        self.running.set(false);
        let joined = handle.join();
        self.state = WorkerState::Stopped;
        tracing::trace!("{}: worker thread joined", self.name);

        joined
            .map(Some)
            .map_err(|_| PipelineError::WorkerPanicked(self.name.clone()))
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Whether a loop has been started and not yet stopped
    pub fn is_running(&self) -> bool {
        self.state == WorkerState::Running
    }

}

impl<R> Drop for WorkerThread<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.running.set(false);
            let _ = handle.join();
        }
    }
}
