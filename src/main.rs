//! listpipe - Main Entry Point
//!
//! Runs the configured pipeline for `run_duration_secs` and prints every
//! module's summary. Usage: `listpipe [CONFIG]`, where `CONFIG` is a `.toml`
//! or `.json` file. Without it the default generator/reverser/validator
//! topology is used.

use anyhow::Context;
use listpipe::{
    config::{AppConfig, LoggingConfig},
    host::{Command, ModuleHost},
    issue::{ChannelSink, Reporter, Severity},
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Issues kept for the end-of-run tally
const ISSUE_BACKLOG: usize = 65_536;

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path {:?} has no file name", path))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter)))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => AppConfig::default(),
    };

    let _log_guard = init_logging(&config.logging)?;

    tracing::info!("Starting listpipe");
    match &config_path {
        Some(path) => tracing::info!("Loaded configuration from {}", path),
        None => tracing::info!("No configuration given, using the default topology"),
    }

    let (sink, issues) = ChannelSink::bounded(ISSUE_BACKLOG);
    let sink = Arc::new(sink);
    let reporter = Reporter::new().with_sink(sink.clone());

    let mut host = ModuleHost::from_config(&config, reporter)?;
    tracing::info!(
        "Modules: {}",
        host.module_names().collect::<Vec<_>>().join(", ")
    );

    host.execute(Command::Configure, &[])
        .context("Failed to configure modules")?;
    host.execute(Command::Start, &[])
        .context("Failed to start modules")?;

    tracing::info!("Running for {} s", config.run_duration_secs);
    std::thread::sleep(config.run_duration());

    tracing::info!("Shutting down...");
    let summaries = host
        .execute(Command::Stop, &[])
        .context("Failed to stop modules")?;
    for (module, summary) in &summaries {
        tracing::info!("{}: {}", module, summary);
    }

    let mut tally: BTreeMap<Severity, usize> = BTreeMap::new();
    for record in issues.try_iter() {
        *tally.entry(record.issue.severity()).or_default() += 1;
    }
    for (severity, count) in tally.iter().rev() {
        tracing::info!("{} issues: {}", severity, count);
    }
    if sink.dropped() > 0 {
        tracing::warn!("{} issues were not counted, the backlog was full", sink.dropped());
    }

    Ok(())
}
