//! Reportable issues and the reporting sink
//!
//! Everything a worker loop wants the outside world to know about, from a
//! per-list progress line to a missing queue, is an [`Issue`]. Issues carry a
//! [`Severity`] and the context fields of the situation (module name, queue
//! name or role, timeout) rather than a preformatted string.
//!
//! A [`Reporter`] fans every issue out to `tracing` and to any registered
//! [`IssueSink`]. Reporting never blocks the caller: [`ChannelSink`] uses
//! `try_send` and counts what it had to drop.

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

/// Something a module reports while running
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Lifecycle messages and end-of-run summaries
    Progress { module: String, message: String },

    /// Per-list progress, only interesting when debugging
    Detail { module: String, message: String },

    /// A required queue endpoint was not available when the loop started
    InvalidQueue { module: String, queue_role: String },

    /// A bounded push or pop ran into its timeout
    QueueTimeout {
        module: String,
        operation: String,
        timeout_ms: u64,
    },

    /// The reading end of an output queue has been dropped
    QueueDisconnected { module: String, operation: String },

    /// The generator has nowhere to send its list
    NoOutputQueues { module: String },

    /// The reversed list is not the reverse of its original
    DataMismatch {
        module: String,
        reversed: String,
        original: String,
    },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::Progress { .. } => Severity::Info,
            Issue::Detail { .. } => Severity::Debug,
            Issue::InvalidQueue { .. } => Severity::Fatal,
            Issue::QueueTimeout { .. }
            | Issue::QueueDisconnected { .. }
            | Issue::NoOutputQueues { .. } => Severity::Warning,
            Issue::DataMismatch { .. } => Severity::Error,
        }
    }

    /// Name of the module that raised the issue
    pub fn module(&self) -> &str {
        match self {
            Issue::Progress { module, .. }
            | Issue::Detail { module, .. }
            | Issue::InvalidQueue { module, .. }
            | Issue::QueueTimeout { module, .. }
            | Issue::QueueDisconnected { module, .. }
            | Issue::NoOutputQueues { module }
            | Issue::DataMismatch { module, .. } => module,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::Progress { message, .. } | Issue::Detail { message, .. } => {
                f.write_str(message)
            }
            Issue::InvalidQueue { queue_role, .. } => {
                write!(f, "The {} queue was not successfully created.", queue_role)
            }
            Issue::QueueTimeout {
                operation,
                timeout_ms,
                ..
            } => write!(f, "{} timed out after {} ms", operation, timeout_ms),
            Issue::QueueDisconnected { operation, .. } => {
                write!(f, "{} failed, the queue has no reader", operation)
            }
            Issue::NoOutputQueues { .. } => f.write_str(
                "No output queues were available, so the generated list of integers will be dropped. \
                 Has initialization been successfully completed?",
            ),
            Issue::DataMismatch {
                reversed, original, ..
            } => write!(
                f,
                "Data mismatch when validating lists: reversed list contents = {}, original list contents = {}",
                reversed, original
            ),
        }
    }
}

/// An issue stamped with the time it was reported
///
/// Serializes as a flat JSON object: `timestamp`, `severity`, `kind` plus the
/// issue's context fields.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRecord {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    #[serde(flatten)]
    pub issue: Issue,
}

/// Receiver of reported issues
#[cfg_attr(test, mockall::automock)]
pub trait IssueSink: Send + Sync {
    fn report(&self, record: &IssueRecord);
}

/// Forwards issues over a bounded channel
///
/// When the channel is full the record is dropped and counted instead of
/// blocking the reporting thread.
pub struct ChannelSink {
    tx: Sender<IssueRecord>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it
    pub fn bounded(capacity: usize) -> (Self, Receiver<IssueRecord>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Records that did not fit into the channel
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl IssueSink for ChannelSink {
    fn report(&self, record: &IssueRecord) {
        if self.tx.try_send(record.clone()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Cheap, clonable handle used by modules to report issues
#[derive(Clone, Default)]
pub struct Reporter {
    sinks: Vec<Arc<dyn IssueSink>>,
}

impl Reporter {
    /// Reporter that only logs through `tracing`
    pub fn new() -> Self {
        Self::default()
    }

    /// Also deliver every issue to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn IssueSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Log an issue and hand it to every sink
    pub fn report(&self, issue: Issue) {
        match issue.severity() {
            Severity::Debug => tracing::debug!("{}: {}", issue.module(), issue),
            Severity::Info => tracing::info!("{}: {}", issue.module(), issue),
            Severity::Warning => tracing::warn!("{}: {}", issue.module(), issue),
            Severity::Error | Severity::Fatal => {
                tracing::error!("{} [{}]: {}", issue.module(), issue.severity(), issue)
            }
        }

        if self.sinks.is_empty() {
            return;
        }
        let record = IssueRecord {
            timestamp: Local::now(),
            severity: issue.severity(),
            issue,
        };
        for sink in &self.sinks {
            sink.report(&record);
        }
    }

    pub fn progress(&self, module: &str, message: impl Into<String>) {
        self.report(Issue::Progress {
            module: module.to_string(),
            message: message.into(),
        });
    }

    pub fn detail(&self, module: &str, message: impl Into<String>) {
        self.report(Issue::Detail {
            module: module.to_string(),
            message: message.into(),
        });
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
