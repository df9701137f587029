//! Timeout-bounded queue protocols shared by every module
//!
//! - **Retry-push**: keep pushing until the value is delivered or the module
//!   is stopped. Each timeout is reported as a warning; the queue timeout is
//!   the only pacing, there is no extra backoff.
//! - **Poll-pop**: a single bounded pop; "no data" is an ordinary outcome
//!   that the caller usually answers with `continue`.
//! - **Mandatory pop**: poll-pop repeated until something arrives or the
//!   module is stopped, warning on every timeout.
//!
//! A disconnected queue (its other end dropped) is paced like a timeout so a
//! loop never spins faster than the timeout granularity. For the same reason
//! the timeout is never shorter than [`MIN_QUEUE_TIMEOUT`].

use crate::issue::{Issue, Reporter};
use crate::queue::{PopError, PushError, QueueSink, QueueSource};
use crate::worker::RunFlag;
use std::time::Duration;

/// Lower bound applied to every queue timeout
pub const MIN_QUEUE_TIMEOUT: Duration = Duration::from_millis(1);

/// Result of a retry-push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The value is in the queue
    Delivered,
    /// The module was stopped before the value could be delivered; it is dropped
    Abandoned,
}

/// Everything a loop body needs to talk to its queues
#[derive(Debug, Clone)]
pub struct WorkerContext {
    module: String,
    timeout: Duration,
    running: RunFlag,
    reporter: Reporter,
}

impl WorkerContext {
    pub fn new(
        module: impl Into<String>,
        timeout: Duration,
        running: RunFlag,
        reporter: Reporter,
    ) -> Self {
        Self {
            module: module.into(),
            timeout: timeout.max(MIN_QUEUE_TIMEOUT),
            running,
            reporter,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn report(&self, issue: Issue) {
        self.reporter.report(issue);
    }

    /// Sleep for `total`, checking the running flag once per queue timeout
    pub fn sleep(&self, total: Duration) -> bool {
        self.running.sleep(total, self.timeout)
    }

    fn timeout_warning(&self, operation: String) {
        self.report(Issue::QueueTimeout {
            module: self.module.clone(),
            operation,
            timeout_ms: self.timeout.as_millis() as u64,
        });
    }

    /// Push `value` until it is delivered or the module is stopped
    pub fn retry_push<T>(&self, sink: &QueueSink<T>, mut value: T) -> PushOutcome {
        while self.is_running() {
            tracing::trace!("{}: pushing onto queue '{}'", self.module, sink.name());
            let operation = format!("push to output queue \"{}\"", sink.name());
            match sink.push(value, self.timeout) {
                Ok(()) => return PushOutcome::Delivered,
                Err(PushError::Timeout(v)) => {
                    value = v;
                    self.timeout_warning(operation);
                }
                Err(PushError::Disconnected(v)) => {
                    value = v;
                    self.report(Issue::QueueDisconnected {
                        module: self.module.clone(),
                        operation,
                    });
                    std::thread::sleep(self.timeout);
                }
            }
        }
        tracing::debug!(
            "{}: stopped while pushing onto '{}', dropping the list",
            self.module,
            sink.name()
        );
        PushOutcome::Abandoned
    }

    /// One bounded pop; `None` means nothing arrived within the timeout
    pub fn poll_pop<T>(&self, source: &QueueSource<T>) -> Option<T> {
        match source.pop(self.timeout) {
            Ok(value) => Some(value),
            Err(PopError::Timeout) => None,
            Err(PopError::Disconnected) => {
                tracing::trace!("{}: queue '{}' has no writer", self.module, source.name());
                std::thread::sleep(self.timeout);
                None
            }
        }
    }

    /// Pop until something arrives or the module is stopped
    ///
    /// `role` names the queue's purpose in the warning text, e.g.
    /// `"original data"`.
    pub fn pop_until_received<T>(&self, source: &QueueSource<T>, role: &str) -> Option<T> {
        while self.is_running() {
            if let Some(value) = self.poll_pop(source) {
                return Some(value);
            }
            self.timeout_warning(format!("pop from {} queue \"{}\"", role, source.name()));
        }
        None
    }
}
