//! Error handling for listpipe
//!
//! This module defines the error type returned by the public API (module
//! lifecycle, queue lookup, command dispatch, configuration) and a Result
//! alias for use throughout the crate.
//!
//! Conditions that happen *inside* a worker loop (queue timeouts, data
//! mismatches, missing queues) are not errors in this sense; they are
//! reported as [`Issue`](crate::issue::Issue)s and absorbed by the loop.

use thiserror::Error;

/// Main error type for listpipe operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// `start` or `configure` was called on a module whose worker is running
    #[error("Module '{0}' is already running")]
    AlreadyRunning(String),

    /// No queue with this name exists in the registry
    #[error("Queue '{0}' is not defined")]
    QueueNotFound(String),

    /// The requested end of a queue has already been handed out
    #[error("The {direction} endpoint of queue '{name}' is already in use")]
    EndpointInUse {
        name: String,
        direction: &'static str,
    },

    /// A queue was configured twice
    #[error("Queue '{0}' is defined more than once")]
    DuplicateQueue(String),

    /// Command name not understood by the dispatcher
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// No module registered under this name
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// Two modules were registered under the same name
    #[error("Module '{0}' is registered more than once")]
    DuplicateModule(String),

    /// The worker thread panicked instead of returning its summary
    #[error("Worker thread of module '{0}' panicked")]
    WorkerPanicked(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for listpipe operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::QueueNotFound("reversed".to_string());
        assert_eq!(err.to_string(), "Queue 'reversed' is not defined");
    }

    #[test]
    fn test_error_with_context() {
        let err = PipelineError::UnknownCommand("pause".to_string());
        let with_ctx = err.with_context("Failed to dispatch");
        assert!(with_ctx.to_string().contains("Failed to dispatch"));
        assert!(with_ctx.to_string().contains("pause"));
    }

    #[test]
    fn test_endpoint_in_use_error() {
        let err = PipelineError::EndpointInUse {
            name: "generated_to_reverse".to_string(),
            direction: "sink",
        };
        assert!(err.to_string().contains("sink"));
        assert!(err.to_string().contains("generated_to_reverse"));
    }

    #[test]
    fn test_result_ext_lazy_context() {
        let result: Result<()> = Err(PipelineError::AlreadyRunning("gen".to_string()));
        let err = result.with_context(|| "start failed".to_string()).unwrap_err();
        assert!(matches!(err, PipelineError::WithContext { .. }));
    }
}
