//! Queue factory
//!
//! The registry owns every configured queue until a module claims one of its
//! ends. Each direction of a queue can be claimed once, which keeps every
//! queue single-producer/single-consumer between modules.

use crate::config::QueueConfig;
use crate::error::{PipelineError, Result};
use crate::payload::Payload;
use crate::queue::{QueueSink, QueueSource};
use crossbeam_channel::{Receiver, Sender};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Unclaimed ends of one queue.
struct QueueSlot<T> {
    name: Arc<str>,
    capacity: usize,
    tx: Option<Sender<T>>,
    rx: Option<Receiver<T>>,
}

/// Registry of named queues, keyed by name
pub struct QueueRegistry<T = Payload> {
    queues: BTreeMap<String, QueueSlot<T>>,
}

impl<T> Default for QueueRegistry<T> {
    fn default() -> Self {
        Self {
            queues: BTreeMap::new(),
        }
    }
}

impl<T> QueueRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from queue definitions
    pub fn from_config(queues: &[QueueConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for queue in queues {
            registry.define(&queue.name, queue.capacity)?;
        }
        Ok(registry)
    }

    /// Create a queue. Capacity is clamped to at least one slot.
    pub fn define(&mut self, name: &str, capacity: usize) -> Result<()> {
        if self.queues.contains_key(name) {
            return Err(PipelineError::DuplicateQueue(name.to_string()));
        }
        let capacity = capacity.max(1);
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        tracing::debug!("Defined queue '{}' with capacity {}", name, capacity);
        self.queues.insert(
            name.to_string(),
            QueueSlot {
                name: Arc::from(name),
                capacity,
                tx: Some(tx),
                rx: Some(rx),
            },
        );
        Ok(())
    }

    /// Configured capacity of a queue
    pub fn capacity(&self, name: &str) -> Option<usize> {
        self.queues.get(name).map(|slot| slot.capacity)
    }

    /// Names of all defined queues, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.queues.keys().map(String::as_str)
    }

    /// Claim the writing end of a queue
    pub fn sink(&mut self, name: &str) -> Result<QueueSink<T>> {
        let slot = self
            .queues
            .get_mut(name)
            .ok_or_else(|| PipelineError::QueueNotFound(name.to_string()))?;
        let tx = slot.tx.take().ok_or_else(|| PipelineError::EndpointInUse {
            name: name.to_string(),
            direction: "sink",
        })?;
        Ok(QueueSink::new(slot.name.clone(), tx))
    }

    /// Claim the reading end of a queue
    pub fn source(&mut self, name: &str) -> Result<QueueSource<T>> {
        let slot = self
            .queues
            .get_mut(name)
            .ok_or_else(|| PipelineError::QueueNotFound(name.to_string()))?;
        let rx = slot.rx.take().ok_or_else(|| PipelineError::EndpointInUse {
            name: name.to_string(),
            direction: "source",
        })?;
        Ok(QueueSource::new(slot.name.clone(), rx))
    }
}
