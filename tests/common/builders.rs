//! Test data builders for creating pipeline configurations

use listpipe::config::{
    AppConfig, GeneratorConfig, ModuleConfig, QueueConfig, TransformerConfig, ValidatorConfig,
};

/// Builder for the generator → reverser → validator topology with test-friendly timings
pub struct PipelineBuilder {
    ints_per_list: usize,
    wait_between_sends_ms: u64,
    queue_timeout_ms: u64,
    capacity: usize,
    generator_outputs: Option<Vec<String>>,
    transformer_input: String,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            ints_per_list: 4,
            wait_between_sends_ms: 5,
            queue_timeout_ms: 10,
            capacity: 64,
            generator_outputs: None,
            transformer_input: "generated_to_reverse".to_string(),
        }
    }

    pub fn ints_per_list(mut self, ints_per_list: usize) -> Self {
        self.ints_per_list = ints_per_list;
        self
    }

    pub fn wait_between_sends_ms(mut self, wait: u64) -> Self {
        self.wait_between_sends_ms = wait;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Override the generator's outputs
    pub fn generator_outputs(mut self, outputs: &[&str]) -> Self {
        self.generator_outputs = Some(outputs.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Point the reverser at a different input queue
    pub fn transformer_input(mut self, queue: &str) -> Self {
        self.transformer_input = queue.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        let mut generator = GeneratorConfig::new("generator");
        generator.ints_per_list = self.ints_per_list;
        generator.wait_between_sends_ms = self.wait_between_sends_ms;
        generator.queue_timeout_ms = self.queue_timeout_ms;
        generator.outputs = self.generator_outputs.unwrap_or_else(|| {
            vec![
                "generated_to_reverse".to_string(),
                "generated_original".to_string(),
            ]
        });

        let mut reverser = TransformerConfig::new("reverser");
        reverser.queue_timeout_ms = self.queue_timeout_ms;
        reverser.input = Some(self.transformer_input);
        reverser.output = Some("reversed".to_string());

        let mut validator = ValidatorConfig::new("validator");
        validator.queue_timeout_ms = self.queue_timeout_ms;
        validator.reversed_data_input = Some("reversed".to_string());
        validator.original_data_input = Some("generated_original".to_string());

        AppConfig {
            run_duration_secs: 1,
            queues: ["generated_to_reverse", "generated_original", "reversed"]
                .into_iter()
                .map(|name| QueueConfig::new(name, self.capacity))
                .collect(),
            modules: vec![
                ModuleConfig::Generator(generator),
                ModuleConfig::Transformer(reverser),
                ModuleConfig::Validator(validator),
            ],
            ..AppConfig::default()
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let config = PipelineBuilder::new()
            .ints_per_list(7)
            .generator_outputs(&["generated_original"])
            .build();

        assert_eq!(config.queues.len(), 3);
        let ModuleConfig::Generator(gen) = &config.modules[0] else {
            panic!("expected generator first");
        };
        assert_eq!(gen.ints_per_list, 7);
        assert_eq!(gen.outputs, vec!["generated_original"]);
    }
}
