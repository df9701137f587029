//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod issue_helpers;

use listpipe::{ModuleHost, RunSummary};
use std::time::Duration;

/// Upper bound for anything a test waits on
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Look up one module's summary from a `stop` result
pub fn summary_of<'a>(summaries: &'a [(String, RunSummary)], module: &str) -> &'a RunSummary {
    summaries
        .iter()
        .find(|(name, _)| name == module)
        .map(|(_, summary)| summary)
        .unwrap_or_else(|| panic!("no summary for module '{}'", module))
}

/// Configure and start every module of `host`
pub fn start_all(host: &mut ModuleHost) {
    host.execute_named("configure", &[]).unwrap();
    host.execute_named("start", &[]).unwrap();
}
