//! GeneratorModule: periodic random list source.
//!
//! Every `wait_between_sends` the generator builds a list of
//! `ints_per_list` random integers in `[1, 1000]` and retry-pushes a copy onto
//! each configured output queue, in configured order. With no outputs the
//! list is dropped and a warning is reported for that iteration.

use crate::config::{
    GeneratorConfig, DEFAULT_INTS_PER_LIST, DEFAULT_QUEUE_TIMEOUT_MS,
    DEFAULT_WAIT_BETWEEN_SENDS_MS,
};
use crate::error::{PipelineError, Result};
use crate::issue::{Issue, Reporter};
use crate::modules::{bind_sink, report_missing_queue, DaqModule, RunSummary};
use crate::payload::Payload;
use crate::protocol::{PushOutcome, WorkerContext};
use crate::queue::{QueueRegistry, QueueSink};
use crate::worker::{WorkerState, WorkerThread};
use std::fmt;
use std::time::Duration;

/// Counters of one generator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    /// Lists built
    pub generated: u64,
    /// Copies delivered, summed over all outputs
    pub sent: u64,
}

impl fmt::Display for GeneratorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generated {} lists, and successfully sent {} copies",
            self.generated, self.sent
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Tunables {
    ints_per_list: usize,
    wait_between_sends: Duration,
    queue_timeout: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            ints_per_list: DEFAULT_INTS_PER_LIST,
            wait_between_sends: Duration::from_millis(DEFAULT_WAIT_BETWEEN_SENDS_MS),
            queue_timeout: Duration::from_millis(DEFAULT_QUEUE_TIMEOUT_MS),
        }
    }
}

/// Random list generator
pub struct GeneratorModule {
    config: GeneratorConfig,
    tunables: Tunables,
    outputs: Vec<QueueSink<Payload>>,
    /// Configured outputs that could not be bound
    missing_outputs: Vec<String>,
    reporter: Reporter,
    worker: WorkerThread<GeneratorStats>,
}

impl GeneratorModule {
    /// Create a generator. Until `configure` runs, the default tunables apply.
    pub fn new(config: GeneratorConfig, reporter: Reporter) -> Self {
        let worker = WorkerThread::new(config.name.clone());
        Self {
            config,
            tunables: Tunables::default(),
            outputs: Vec::new(),
            missing_outputs: Vec::new(),
            reporter,
            worker,
        }
    }

    /// Number of bound output queues
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}

impl DaqModule for GeneratorModule {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self, queues: &mut QueueRegistry<Payload>) {
        tracing::trace!("{}: entering init", self.config.name);
        self.outputs.clear();
        self.missing_outputs.clear();
        for output in &self.config.outputs {
            match bind_sink(queues, &self.config.name, Some(output)) {
                Some(sink) => self.outputs.push(sink),
                None => self.missing_outputs.push(output.clone()),
            }
        }
        tracing::trace!("{}: exiting init", self.config.name);
    }

    fn configure(&mut self, _args: &[String]) -> Result<()> {
        if self.worker.is_running() {
            return Err(PipelineError::AlreadyRunning(self.config.name.clone()));
        }
        self.tunables = Tunables {
            ints_per_list: self.config.ints_per_list,
            wait_between_sends: self.config.wait_between_sends(),
            queue_timeout: self.config.queue_timeout(),
        };
        tracing::debug!("{}: configured {:?}", self.config.name, self.tunables);
        Ok(())
    }

    fn start(&mut self, _args: &[String]) -> Result<()> {
        let name = self.config.name.clone();
        let tunables = self.tunables;
        let outputs = self.outputs.clone();
        let missing = self.missing_outputs.clone();
        let reporter = self.reporter.clone();

        self.worker.start(move |running| {
            let ctx = WorkerContext::new(name, tunables.queue_timeout, running, reporter);
            for queue in &missing {
                report_missing_queue(&ctx, &format!("output \"{}\"", queue));
            }
            if !missing.is_empty() {
                return GeneratorStats::default();
            }
            run(&ctx, &outputs, tunables.ints_per_list, tunables.wait_between_sends)
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
        Ok(stats.map(RunSummary::Generator))
    }

    fn state(&self) -> WorkerState {
        self.worker.state()
    }
}

/// Generator loop body
fn run(
    ctx: &WorkerContext,
    outputs: &[QueueSink<Payload>],
    ints_per_list: usize,
    wait_between_sends: Duration,
) -> GeneratorStats {
    tracing::trace!("{}: entering work loop", ctx.module());
    let mut stats = GeneratorStats::default();
    let mut rng = rand::rng();

    while ctx.is_running() {
        tracing::trace!("{}: creating list of length {}", ctx.module(), ints_per_list);
        let list = Payload::random_with(&mut rng, ints_per_list);
        stats.generated += 1;
        ctx.reporter().detail(
            ctx.module(),
            format!(
                "Generated list #{} with contents {} and size {}.",
                stats.generated,
                list,
                list.len()
            ),
        );

        tracing::trace!("{}: pushing list onto {} outputs", ctx.module(), outputs.len());
        for sink in outputs {
            if ctx.retry_push(sink, list.clone()) == PushOutcome::Delivered {
                stats.sent += 1;
            }
        }
        if outputs.is_empty() {
            ctx.report(Issue::NoOutputQueues {
                module: ctx.module().to_string(),
            });
        }

        ctx.sleep(wait_between_sends);
    }

    ctx.reporter()
        .progress(ctx.module(), format!("Exiting the work loop, {}.", stats));
    stats
}
