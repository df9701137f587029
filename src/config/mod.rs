//! Configuration module for listpipe
//!
//! This module describes a complete pipeline: the queues to create, the
//! modules to instantiate and wire to them, how long the binary runs, and
//! how it logs.
//!
//! # Files
//!
//! Configuration is read from TOML (`.toml`) or JSON (`.json`, anything
//! else is treated as TOML). Every field has a default, so an empty file is
//! a valid configuration for an empty pipeline, and [`AppConfig::default`]
//! is the standard generator → reverser → validator topology.
//!
//! # Example
//!
//! ```ignore
//! use listpipe::config::AppConfig;
//!
//! let config = AppConfig::load("pipeline.toml")?;
//! for module in &config.modules {
//!     println!("{} ({})", module.name(), module.kind());
//! }
//! ```

pub mod modules;

pub use modules::*;

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for queue push/pop operations in milliseconds
pub const DEFAULT_QUEUE_TIMEOUT_MS: u64 = 100;

/// Default number of integers in a generated list
pub const DEFAULT_INTS_PER_LIST: usize = 4;

/// Default pause between generated lists in milliseconds
pub const DEFAULT_WAIT_BETWEEN_SENDS_MS: u64 = 1000;

/// Default number of lists a queue can hold
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Default time the binary lets the pipeline run
pub const DEFAULT_RUN_DURATION_SECS: u64 = 10;

/// Default `tracing` filter directive
pub const DEFAULT_LOG_FILTER: &str = "info,listpipe=debug";

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_run_duration_secs() -> u64 {
    DEFAULT_RUN_DURATION_SECS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// A named, bounded queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub name: String,

    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// How long the binary keeps the modules running
    #[serde(default = "default_run_duration_secs")]
    pub run_duration_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub queues: Vec<QueueConfig>,

    /// Modules in registration order; producers first
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut generator = GeneratorConfig::new("generator");
        generator.outputs = vec![
            "generated_to_reverse".to_string(),
            "generated_original".to_string(),
        ];

        let mut reverser = TransformerConfig::new("reverser");
        reverser.input = Some("generated_to_reverse".to_string());
        reverser.output = Some("reversed".to_string());

        let mut validator = ValidatorConfig::new("validator");
        validator.reversed_data_input = Some("reversed".to_string());
        validator.original_data_input = Some("generated_original".to_string());

        Self {
            run_duration_secs: DEFAULT_RUN_DURATION_SECS,
            logging: LoggingConfig::default(),
            queues: vec![
                QueueConfig::new("generated_to_reverse", DEFAULT_QUEUE_CAPACITY),
                QueueConfig::new("generated_original", DEFAULT_QUEUE_CAPACITY),
                QueueConfig::new("reversed", DEFAULT_QUEUE_CAPACITY),
            ],
            modules: vec![
                ModuleConfig::Generator(generator),
                ModuleConfig::Transformer(reverser),
                ModuleConfig::Validator(validator),
            ],
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl AppConfig {
    /// Load a configuration file; the format is chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                PipelineError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })
        } else {
            toml::from_str(&content).map_err(|e| {
                PipelineError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })
        }
    }

    /// Save the configuration; the format is chosen by extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipelineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = if is_json(path) {
            serde_json::to_string_pretty(self)
                .map_err(|e| PipelineError::Config(format!("Failed to serialize config: {}", e)))?
        } else {
            toml::to_string_pretty(self)
                .map_err(|e| PipelineError::Config(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            PipelineError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topology() {
        let config = AppConfig::default();
        assert_eq!(config.queues.len(), 3);
        let names: Vec<_> = config.modules.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["generator", "reverser", "validator"]);

        // Every queue referenced by a module is defined
        let ModuleConfig::Validator(val) = &config.modules[2] else {
            panic!("expected validator last");
        };
        for queue in [&val.reversed_data_input, &val.original_data_input] {
            let queue = queue.as_deref().unwrap();
            assert!(config.queues.iter().any(|q| q.name == queue));
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");

        let config = AppConfig::default();
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pipeline.json");

        let mut config = AppConfig::default();
        config.logging.file = Some(PathBuf::from("listpipe.log"));
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.trim_start().starts_with('{'));
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.run_duration(), Duration::from_secs(10));
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.queues.is_empty());
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_queue_capacity_default() {
        let config: AppConfig = toml::from_str(
            r#"
            [[queues]]
            name = "a"
            "#,
        )
        .unwrap();
        assert_eq!(config.queues[0].capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
