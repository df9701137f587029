//! TransformerModule: list reverser.
//!
//! Pops lists from its input queue, reverses each one and retry-pushes the
//! result onto its output queue. One list in, one list out; nothing is
//! merged, split or reordered.

use crate::config::{TransformerConfig, DEFAULT_QUEUE_TIMEOUT_MS};
use crate::error::{PipelineError, Result};
use crate::issue::Reporter;
use crate::modules::{bind_sink, bind_source, report_if_missing, DaqModule, RunSummary};
use crate::payload::Payload;
use crate::protocol::{PushOutcome, WorkerContext};
use crate::queue::{QueueRegistry, QueueSink, QueueSource};
use crate::worker::{WorkerState, WorkerThread};
use std::fmt;
use std::time::Duration;

/// Counters of one transformer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformerStats {
    pub received: u64,
    pub sent: u64,
}

impl fmt::Display for TransformerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} lists, and successfully sent {}",
            self.received, self.sent
        )
    }
}

/// List reverser
pub struct TransformerModule {
    config: TransformerConfig,
    queue_timeout: Duration,
    input: Option<QueueSource<Payload>>,
    output: Option<QueueSink<Payload>>,
    reporter: Reporter,
    worker: WorkerThread<TransformerStats>,
}

impl TransformerModule {
    pub fn new(config: TransformerConfig, reporter: Reporter) -> Self {
        let worker = WorkerThread::new(config.name.clone());
        Self {
            config,
            queue_timeout: Duration::from_millis(DEFAULT_QUEUE_TIMEOUT_MS),
            input: None,
            output: None,
            reporter,
            worker,
        }
    }
}

impl DaqModule for TransformerModule {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self, queues: &mut QueueRegistry<Payload>) {
        tracing::trace!("{}: entering init", self.config.name);
        self.input = bind_source(queues, &self.config.name, self.config.input.as_deref());
        self.output = bind_sink(queues, &self.config.name, self.config.output.as_deref());
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
        let input = self.input.clone();
        let output = self.output.clone();
        let reporter = self.reporter.clone();

        self.worker.start(move |running| {
            let ctx = WorkerContext::new(name, timeout, running, reporter);
            report_if_missing(&ctx, &input, "input");
            report_if_missing(&ctx, &output, "output");
            let (Some(input), Some(output)) = (input, output) else {
                return TransformerStats::default();
            };
            run(&ctx, &input, &output)
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
        Ok(stats.map(RunSummary::Transformer))
    }

    fn state(&self) -> WorkerState {
        self.worker.state()
    }
}

fn run(
    ctx: &WorkerContext,
    input: &QueueSource<Payload>,
    output: &QueueSink<Payload>,
) -> TransformerStats {
    tracing::trace!("{}: entering work loop", ctx.module());
    let mut stats = TransformerStats::default();

    while ctx.is_running() {
        tracing::trace!("{}: going to receive data from input queue", ctx.module());
        let Some(mut list) = ctx.poll_pop(input) else {
            continue;
        };

        stats.received += 1;
        tracing::trace!(
            "{}: received list #{} of size {}, reversing its contents",
            ctx.module(),
            stats.received,
            list.len()
        );
        list.reverse();
        ctx.reporter().detail(
            ctx.module(),
            format!(
                "Reversed list #{}, new contents {} and size {}.",
                stats.received,
                list,
                list.len()
            ),
        );

        if ctx.retry_push(output, list) == PushOutcome::Delivered {
            stats.sent += 1;
        }
    }

    ctx.reporter()
        .progress(ctx.module(), format!("Exiting the work loop, {}.", stats));
    stats
}
