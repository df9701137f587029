//! Integration tests for configuration-driven pipelines
//!
//! These tests validate the path from a configuration file to running modules:
//! - TOML and JSON files with defaults filled in
//! - Command names as they arrive from the outside
//! - Wiring errors detected while building the host

mod common;

use common::builders::PipelineBuilder;
use common::issue_helpers::{is_detail, recording_reporter, wait_for_issue};
use common::{start_all, summary_of};
use listpipe::config::{AppConfig, ModuleConfig};
use listpipe::{Command, ModuleHost, PipelineError, Reporter, RunSummary, Severity};
use std::io::Write;

const PIPELINE_TOML: &str = r#"
run_duration_secs = 2

[logging]
filter = "warn"

[[queues]]
name = "to_reverse"
capacity = 5

[[queues]]
name = "original"

[[queues]]
name = "reversed"

[[modules]]
kind = "generator"
name = "gen"
ints_per_list = 3
wait_between_sends_ms = 5
queue_timeout_ms = 10
outputs = ["to_reverse", "original"]

[[modules]]
kind = "transformer"
name = "rev"
queue_timeout_ms = 10
input = "to_reverse"
output = "reversed"

[[modules]]
kind = "validator"
name = "val"
queue_timeout_ms = 10
reversed_data_input = "reversed"
original_data_input = "original"
"#;

#[test]
fn test_toml_file_drives_pipeline() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(PIPELINE_TOML.as_bytes()).unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.run_duration_secs, 2);
    assert_eq!(config.logging.filter, "warn");
    assert_eq!(config.queues[0].capacity, 5);
    assert_eq!(config.queues[1].capacity, 10);

    let (reporter, issues) = recording_reporter();
    let mut host = ModuleHost::from_config(&config, reporter).unwrap();
    assert_eq!(host.module_names().collect::<Vec<_>>(), vec!["gen", "rev", "val"]);

    start_all(&mut host);
    wait_for_issue(&issues, |i| is_detail(i, "val", "Validating list #3,"));
    let summaries = host.execute_named("stop", &[]).unwrap();

    let RunSummary::Validator(val) = *summary_of(&summaries, "val") else {
        panic!("expected validator stats");
    };
    assert!(val.compared >= 3);
    assert_eq!(val.mismatched, 0);
}

#[test]
fn test_json_round_trip_builds_same_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");

    let config = PipelineBuilder::new().ints_per_list(2).build();
    config.save(&path).unwrap();
    let loaded = AppConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let host = ModuleHost::from_config(&loaded, Reporter::new()).unwrap();
    assert_eq!(
        host.module_names().collect::<Vec<_>>(),
        vec!["generator", "reverser", "validator"]
    );
}

#[test]
fn test_unknown_command_name() {
    let config = PipelineBuilder::new().build();
    let mut host = ModuleHost::from_config(&config, Reporter::new()).unwrap();
    let err = host.execute_named("restart", &[]).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownCommand(ref name) if name == "restart"));
}

#[test]
fn test_single_module_commands() {
    let config = PipelineBuilder::new().build();
    let mut host = ModuleHost::from_config(&config, Reporter::new()).unwrap();
    host.execute_on("reverser", Command::Configure, &[]).unwrap();
    host.execute_on("reverser", Command::Start, &[]).unwrap();
    assert!(matches!(
        host.execute_on("reverser", Command::Configure, &[]),
        Err(PipelineError::AlreadyRunning(_))
    ));

    let summary = host.execute_on("reverser", Command::Stop, &[]).unwrap();
    assert!(matches!(summary, Some(RunSummary::Transformer(s)) if s.received == 0));
    assert!(host.execute_on("reverser", Command::Stop, &[]).unwrap().is_none());
}

#[test]
fn test_duplicate_module_names_rejected() {
    let mut config = PipelineBuilder::new().build();
    let copy = config.modules[1].clone();
    config.modules.push(copy);

    let err = ModuleHost::from_config(&config, Reporter::new()).unwrap_err();
    let PipelineError::WithContext { source, .. } = err else {
        panic!("expected context on the error");
    };
    assert!(matches!(*source, PipelineError::DuplicateModule(ref name) if name == "reverser"));
}

#[test]
fn test_shared_input_leaves_second_reader_unbound() {
    // Two reversers reading the same queue: only the first one gets it
    let mut config = PipelineBuilder::new().build();
    let ModuleConfig::Transformer(mut second) = config.modules[1].clone() else {
        panic!("expected transformer");
    };
    second.name = "reverser_2".to_string();
    second.output = None;
    config.modules.push(ModuleConfig::Transformer(second));

    let (reporter, issues) = recording_reporter();
    let mut host = ModuleHost::from_config(&config, reporter).unwrap();
    start_all(&mut host);

    let fatal = wait_for_issue(&issues, |i| {
        i.module() == "reverser_2" && i.severity() == Severity::Fatal
    });
    assert!(fatal.to_string().contains("input"));
    host.execute(Command::Stop, &[]).unwrap();
}
