//! ValidatorModule: checks the reverser's work.
//!
//! Every list taken from the reversed-data queue is paired with the next
//! list from the original-data queue and compared element by element. The
//! original pop is mandatory: once a reversed list is in hand the validator
//! keeps waiting for its partner, warning on every timeout.
//!
//! Pairing is by arrival order only. A list dropped upstream shifts every
//! later pair and shows up as a run of mismatches.

use crate::config::{ValidatorConfig, DEFAULT_QUEUE_TIMEOUT_MS};
use crate::error::{PipelineError, Result};
use crate::issue::{Issue, Reporter};
use crate::modules::{bind_source, report_if_missing, DaqModule, RunSummary};
use crate::payload::Payload;
use crate::protocol::WorkerContext;
use crate::queue::{QueueRegistry, QueueSource};
use crate::worker::{WorkerState, WorkerThread};
use std::fmt;
use std::time::Duration;

/// Counters of one validator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorStats {
    /// Reversed lists taken from the queue
    pub received: u64,
    /// Reversed lists that were paired with an original
    pub compared: u64,
    pub mismatched: u64,
}

impl fmt::Display for ValidatorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} reversed lists, compared {} of them to their original data, and found {} mismatches",
            self.received, self.compared, self.mismatched
        )
    }
}

/// Reversed list validator
pub struct ValidatorModule {
    config: ValidatorConfig,
    queue_timeout: Duration,
    reversed: Option<QueueSource<Payload>>,
    original: Option<QueueSource<Payload>>,
    reporter: Reporter,
    worker: WorkerThread<ValidatorStats>,
}

impl ValidatorModule {
    pub fn new(config: ValidatorConfig, reporter: Reporter) -> Self {
        let worker = WorkerThread::new(config.name.clone());
        Self {
            config,
            queue_timeout: Duration::from_millis(DEFAULT_QUEUE_TIMEOUT_MS),
            reversed: None,
            original: None,
            reporter,
            worker,
        }
    }
}

impl DaqModule for ValidatorModule {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self, queues: &mut QueueRegistry<Payload>) {
        tracing::trace!("{}: entering init", self.config.name);
        self.reversed = bind_source(
            queues,
            &self.config.name,
            self.config.reversed_data_input.as_deref(),
        );
        self.original = bind_source(
            queues,
            &self.config.name,
            self.config.original_data_input.as_deref(),
        );
        tracing::trace!("{}: exiting init", self.config.name);
    }

    fn configure(&mut self, _args: &[String]) -> Result<()> {
        if self.worker.is_running() {
            return Err(PipelineError::AlreadyRunning(self.config.name.clone()));
        }
        self.queue_timeout = self.config.queue_timeout();
        Ok(())
    }

    fn start(&mut self, _args: &[String]) -> Result<()> {
        let name = self.config.name.clone();
        let timeout = self.queue_timeout;
        let reversed = self.reversed.clone();
        let original = self.original.clone();
        let reporter = self.reporter.clone();

        self.worker.start(move |running| {
            let ctx = WorkerContext::new(name, timeout, running, reporter);
            report_if_missing(&ctx, &reversed, "reversed data input");
            report_if_missing(&ctx, &original, "original data input");
            let (Some(reversed), Some(original)) = (reversed, original) else {
                return ValidatorStats::default();
            };
            run(&ctx, &reversed, &original)
        })?;

        self.reporter
            .progress(&self.config.name, format!("{} successfully started", self.config.name));
        Ok(())
    }

    fn stop(&mut self, _args: &[String]) -> Result<Option<RunSummary>> {
        let stats = self.worker.stop()?;
        if stats.is_some() {
            self.reporter
                .progress(&self.config.name, format!("{} successfully stopped", self.config.name));
        }
        Ok(stats.map(RunSummary::Validator))
    }

    fn state(&self) -> WorkerState {
        self.worker.state()
    }
}

fn run(
    ctx: &WorkerContext,
    reversed_input: &QueueSource<Payload>,
    original_input: &QueueSource<Payload>,
) -> ValidatorStats {
    tracing::trace!("{}: entering work loop", ctx.module());
    let mut stats = ValidatorStats::default();

    while ctx.is_running() {
        tracing::trace!("{}: going to receive data from reversed data queue", ctx.module());
        let Some(reversed) = ctx.poll_pop(reversed_input) else {
            continue;
        };
        stats.received += 1;
        tracing::trace!(
            "{}: received reversed list #{}, waiting for its original",
            ctx.module(),
            stats.received
        );

        // Stopped while waiting: the reversed list is counted but never compared
        let Some(original) = ctx.pop_until_received(original_input, "original data") else {
            break;
        };
        stats.compared += 1;

        ctx.reporter().detail(
            ctx.module(),
            format!(
                "Validating list #{}, original contents {} and reversed contents {}.",
                stats.received, original, reversed
            ),
        );

        if !reversed.is_reverse_of(&original) {
            stats.mismatched += 1;
            ctx.report(Issue::DataMismatch {
                module: ctx.module().to_string(),
                reversed: reversed.to_string(),
                original: original.to_string(),
            });
        }
    }

    ctx.reporter()
        .progress(ctx.module(), format!("Exiting the work loop, {}.", stats));
    stats
}
