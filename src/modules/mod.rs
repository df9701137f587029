//! Worker modules
//!
//! All three modules follow the same shape: endpoints are bound from the
//! [`QueueRegistry`] in `init`, tunables are applied in `configure`, and
//! `start`/`stop` drive a single loop on a [`WorkerThread`](crate::worker::WorkerThread).
//! The loop's counters live on the worker thread and come back from `stop`
//! as a [`RunSummary`].
//!
//! ```text
//! [GeneratorModule] ──generated_to_reverse──► [TransformerModule] ──reversed──┐
//!         └──────────────generated_original───────────────────────────────┐   │
//!                                                                         ▼   ▼
//!                                                                  [ValidatorModule]
//! ```

pub mod generator;
pub mod transformer;
pub mod validator;

pub use generator::{GeneratorModule, GeneratorStats};
pub use transformer::{TransformerModule, TransformerStats};
pub use validator::{ValidatorModule, ValidatorStats};

use crate::config::ModuleConfig;
use crate::error::Result;
use crate::issue::{Issue, Reporter};
use crate::payload::Payload;
use crate::protocol::WorkerContext;
use crate::queue::{QueueRegistry, QueueSink, QueueSource};
use crate::worker::WorkerState;
use std::fmt;

/// A start/stop-controlled worker wired to named queues
pub trait DaqModule: Send {
    /// Instance name
    fn name(&self) -> &str;

    /// Bind queue endpoints. Missing queues are remembered, not fatal here;
    /// the loop refuses to run when started.
    fn init(&mut self, queues: &mut QueueRegistry<Payload>);

    /// Apply the module's tunables. Rejected while running.
    fn configure(&mut self, args: &[String]) -> Result<()>;

    /// Spawn the worker loop. Rejected while running.
    fn start(&mut self, args: &[String]) -> Result<()>;

    /// Stop and join the worker loop, returning its counters
    fn stop(&mut self, args: &[String]) -> Result<Option<RunSummary>>;

    fn state(&self) -> WorkerState;
}

/// Counters of one completed run, per module kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary {
    Generator(GeneratorStats),
    Transformer(TransformerStats),
    Validator(ValidatorStats),
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunSummary::Generator(s) => s.fmt(f),
            RunSummary::Transformer(s) => s.fmt(f),
            RunSummary::Validator(s) => s.fmt(f),
        }
    }
}

/// Instantiate the module described by `config`
pub fn build_module(config: &ModuleConfig, reporter: Reporter) -> Box<dyn DaqModule> {
    match config {
        ModuleConfig::Generator(c) => Box::new(GeneratorModule::new(c.clone(), reporter)),
        ModuleConfig::Transformer(c) => Box::new(TransformerModule::new(c.clone(), reporter)),
        ModuleConfig::Validator(c) => Box::new(ValidatorModule::new(c.clone(), reporter)),
    }
}

fn bind_sink(
    queues: &mut QueueRegistry<Payload>,
    module: &str,
    name: Option<&str>,
) -> Option<QueueSink<Payload>> {
    let name = name?;
    queues
        .sink(name)
        .map_err(|e| tracing::error!("{}: cannot bind output queue: {}", module, e))
        .ok()
}

fn bind_source(
    queues: &mut QueueRegistry<Payload>,
    module: &str,
    name: Option<&str>,
) -> Option<QueueSource<Payload>> {
    let name = name?;
    queues
        .source(name)
        .map_err(|e| tracing::error!("{}: cannot bind input queue: {}", module, e))
        .ok()
}

fn report_missing_queue(ctx: &WorkerContext, queue_role: &str) {
    ctx.report(Issue::InvalidQueue {
        module: ctx.module().to_string(),
        queue_role: queue_role.to_string(),
    });
}

fn report_if_missing<E>(ctx: &WorkerContext, endpoint: &Option<E>, queue_role: &str) {
    if endpoint.is_none() {
        report_missing_queue(ctx, queue_role);
    }
}
