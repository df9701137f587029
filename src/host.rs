//! Command dispatch over a set of modules
//!
//! The host owns the queue registry and every module built from it. Commands
//! arrive by name (`"configure"`, `"start"`, `"stop"`) together with a list of
//! string arguments and are mapped onto the [`DaqModule`] methods by
//! `dispatch`.
//!
//! Ordering across modules:
//! - `configure` runs in registration order
//! - `start` runs in reverse registration order, so consumers are already
//!   polling when producers begin
//! - `stop` runs in registration order, so producers stop first

use crate::config::AppConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::issue::Reporter;
use crate::modules::{build_module, DaqModule, RunSummary};
use crate::payload::Payload;
use crate::queue::QueueRegistry;
use crate::worker::WorkerState;
use std::fmt;
use std::str::FromStr;

/// A lifecycle command understood by every module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Configure,
    Start,
    Stop,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Configure, Command::Start, Command::Stop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl FromStr for Command {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "configure" => Ok(Self::Configure),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(PipelineError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a command onto the module's handler
fn dispatch(
    module: &mut dyn DaqModule,
    command: Command,
    args: &[String],
) -> Result<Option<RunSummary>> {
    match command {
        Command::Configure => module.configure(args).map(|()| None),
        Command::Start => module.start(args).map(|()| None),
        Command::Stop => module.stop(args),
    }
}

/// Owner of the queues and the modules wired to them
pub struct ModuleHost {
    modules: Vec<Box<dyn DaqModule>>,
    queues: QueueRegistry<Payload>,
    reporter: Reporter,
}

impl fmt::Debug for ModuleHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHost")
            .field("modules", &self.module_names().collect::<Vec<_>>())
            .field("queues", &self.queues.names().count())
            .finish()
    }
}

impl ModuleHost {
    /// Create a host over an already populated registry
    pub fn new(queues: QueueRegistry<Payload>, reporter: Reporter) -> Self {
        Self {
            modules: Vec::new(),
            queues,
            reporter,
        }
    }

    /// Build queues and modules from a configuration
    pub fn from_config(config: &AppConfig, reporter: Reporter) -> Result<Self> {
        let queues =
            QueueRegistry::from_config(&config.queues).context("Failed to create queues")?;
        let mut host = Self::new(queues, reporter);
        for module in &config.modules {
            let built = build_module(module, host.reporter.clone());
            host.add_module(built)
                .with_context(|| format!("Failed to add {} module", module.kind()))?;
        }
        Ok(host)
    }

    /// Register a module and let it bind its queues
    pub fn add_module(&mut self, mut module: Box<dyn DaqModule>) -> Result<()> {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            return Err(PipelineError::DuplicateModule(module.name().to_string()));
        }
        module.init(&mut self.queues);
        tracing::debug!("Registered module '{}'", module.name());
        self.modules.push(module);
        Ok(())
    }

    /// Module names in registration order
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn state_of(&self, name: &str) -> Option<WorkerState> {
        self.modules
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.state())
    }

    /// Queue endpoints not claimed by any module
    pub fn queues_mut(&mut self) -> &mut QueueRegistry<Payload> {
        &mut self.queues
    }

    /// Apply `command` to every module
    ///
    /// Every module is attempted even if an earlier one fails; the first
    /// error is returned. Summaries come back for modules that stopped.
    pub fn execute(
        &mut self,
        command: Command,
        args: &[String],
    ) -> Result<Vec<(String, RunSummary)>> {
        tracing::info!("Executing '{}' on {} modules", command, self.modules.len());

        let order: Vec<usize> = match command {
            Command::Start => (0..self.modules.len()).rev().collect(),
            Command::Configure | Command::Stop => (0..self.modules.len()).collect(),
        };

        let mut summaries = Vec::new();
        let mut first_error = None;
        for index in order {
            let module = &mut self.modules[index];
            match dispatch(module.as_mut(), command, args) {
                Ok(Some(summary)) => summaries.push((module.name().to_string(), summary)),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("'{}' failed on module '{}': {}", command, module.name(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summaries),
        }
    }

    /// Parse `command` and apply it to every module
    pub fn execute_named(
        &mut self,
        command: &str,
        args: &[String],
    ) -> Result<Vec<(String, RunSummary)>> {
        let command: Command = command.parse()?;
        self.execute(command, args)
    }

    /// Apply `command` to the module called `name`
    pub fn execute_on(
        &mut self,
        name: &str,
        command: Command,
        args: &[String],
    ) -> Result<Option<RunSummary>> {
        let module = self
            .modules
            .iter_mut()
            .find(|m| m.name() == name)
            .ok_or_else(|| PipelineError::UnknownModule(name.to_string()))?;
        tracing::debug!("Executing '{}' on module '{}'", command, name);
        dispatch(module.as_mut(), command, args)
    }
}

impl Drop for ModuleHost {
    fn drop(&mut self) {
        if self.modules.iter().any(|m| m.state() == WorkerState::Running) {
            tracing::debug!("Host dropped with running modules, stopping them");
            if let Err(e) = self.execute(Command::Stop, &[]) {
                tracing::warn!("Failed to stop modules on drop: {}", e);
            }
        }
    }
}
