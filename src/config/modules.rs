//! Per-module configuration
//!
//! Each module kind has its own table. Queue names are optional so that a
//! misconfigured module still loads; the module then refuses to run and
//! reports which queue is missing.
//!
//! ```toml
//! [[modules]]
//! kind = "generator"
//! name = "generator"
//! outputs = ["generated_to_reverse", "generated_original"]
//! ints_per_list = 4
//! wait_between_sends_ms = 1000
//!
//! [[modules]]
//! kind = "transformer"
//! name = "reverser"
//! input = "generated_to_reverse"
//! output = "reversed"
//! ```

use super::{DEFAULT_INTS_PER_LIST, DEFAULT_QUEUE_TIMEOUT_MS, DEFAULT_WAIT_BETWEEN_SENDS_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_queue_timeout_ms() -> u64 {
    DEFAULT_QUEUE_TIMEOUT_MS
}

fn default_ints_per_list() -> usize {
    DEFAULT_INTS_PER_LIST
}

fn default_wait_between_sends_ms() -> u64 {
    DEFAULT_WAIT_BETWEEN_SENDS_MS
}

/// Configuration of one module instance, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleConfig {
    Generator(GeneratorConfig),
    Transformer(TransformerConfig),
    Validator(ValidatorConfig),
}

impl ModuleConfig {
    /// Instance name of the module
    pub fn name(&self) -> &str {
        match self {
            ModuleConfig::Generator(c) => &c.name,
            ModuleConfig::Transformer(c) => &c.name,
            ModuleConfig::Validator(c) => &c.name,
        }
    }

    /// Kind label as written in the config file
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleConfig::Generator(_) => "generator",
            ModuleConfig::Transformer(_) => "transformer",
            ModuleConfig::Validator(_) => "validator",
        }
    }
}

/// Random list generator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub name: String,

    /// Length of every generated list
    #[serde(default = "default_ints_per_list")]
    pub ints_per_list: usize,

    /// Pause after each list has been handed to all outputs
    #[serde(default = "default_wait_between_sends_ms")]
    pub wait_between_sends_ms: u64,

    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,

    /// Output queues, in delivery order. Empty means every list is dropped.
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl GeneratorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ints_per_list: DEFAULT_INTS_PER_LIST,
            wait_between_sends_ms: DEFAULT_WAIT_BETWEEN_SENDS_MS,
            queue_timeout_ms: DEFAULT_QUEUE_TIMEOUT_MS,
            outputs: Vec::new(),
        }
    }

    pub fn wait_between_sends(&self) -> Duration {
        Duration::from_millis(self.wait_between_sends_ms)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}

/// List reverser settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformerConfig {
    pub name: String,

    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl TransformerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue_timeout_ms: DEFAULT_QUEUE_TIMEOUT_MS,
            input: None,
            output: None,
        }
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}

/// Reversed list validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub name: String,

    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,

    /// Queue carrying the transformer's output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed_data_input: Option<String>,

    /// Queue carrying an untouched copy of the generated lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data_input: Option<String>,
}

impl ValidatorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue_timeout_ms: DEFAULT_QUEUE_TIMEOUT_MS,
            reversed_data_input: None,
            original_data_input: None,
        }
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_defaults_from_minimal_toml() {
        let config: ModuleConfig = toml::from_str(
            r#"
            kind = "generator"
            name = "gen"
            "#,
        )
        .unwrap();

        let ModuleConfig::Generator(gen) = config else {
            panic!("expected a generator config");
        };
        assert_eq!(gen.ints_per_list, 4);
        assert_eq!(gen.wait_between_sends(), Duration::from_millis(1000));
        assert_eq!(gen.queue_timeout(), Duration::from_millis(100));
        assert!(gen.outputs.is_empty());
    }

    #[test]
    fn test_validator_from_json() {
        let config: ModuleConfig = serde_json::from_str(
            r#"{
                "kind": "validator",
                "name": "val",
                "queue_timeout_ms": 25,
                "reversed_data_input": "reversed",
                "original_data_input": "original"
            }"#,
        )
        .unwrap();

        assert_eq!(config.name(), "val");
        assert_eq!(config.kind(), "validator");
        let ModuleConfig::Validator(val) = config else {
            panic!("expected a validator config");
        };
        assert_eq!(val.queue_timeout(), Duration::from_millis(25));
        assert_eq!(val.original_data_input.as_deref(), Some("original"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<ModuleConfig, _> = toml::from_str(
            r#"
            kind = "sorter"
            name = "x"
            "#,
        );
        assert!(result.is_err());
    }
}
