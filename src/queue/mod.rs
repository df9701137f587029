//! Named, bounded queues connecting modules
//!
//! A queue is a capacity-bounded crossbeam channel identified by a configured
//! name. Modules never see the channel itself; they hold a directional
//! endpoint obtained from the [`QueueRegistry`]:
//!
//! - [`QueueSink`] - the writing end, `push` with a timeout
//! - [`QueueSource`] - the reading end, `pop` with a timeout
//!
//! Both operations block for at most the given timeout. A push that times
//! out hands the value back so the caller can retry without cloning.

pub mod registry;

pub use registry::QueueRegistry;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Failed push; the rejected value is returned to the caller
#[derive(Debug, PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue stayed full for the whole timeout
    Timeout(T),
    /// The reading end no longer exists
    Disconnected(T),
}

impl<T> PushError<T> {
    /// Take back the value that could not be pushed
    pub fn into_inner(self) -> T {
        match self {
            PushError::Timeout(v) | PushError::Disconnected(v) => v,
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Timeout(_) => f.write_str("timed out pushing onto a full queue"),
            PushError::Disconnected(_) => f.write_str("queue has no reader"),
        }
    }
}

/// Failed pop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// Nothing arrived within the timeout
    Timeout,
    /// The queue is empty and the writing end no longer exists
    Disconnected,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::Timeout => f.write_str("timed out waiting for data"),
            PopError::Disconnected => f.write_str("queue has no writer"),
        }
    }
}

/// Writing end of a named queue
pub struct QueueSink<T> {
    name: Arc<str>,
    tx: Sender<T>,
}

// Manual impl: `T` itself need not be Clone.
impl<T> Clone for QueueSink<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for QueueSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueSink")
            .field("name", &self.name)
            .field("len", &self.tx.len())
            .field("capacity", &self.tx.capacity())
            .finish()
    }
}

impl<T> QueueSink<T> {
    pub(crate) fn new(name: Arc<str>, tx: Sender<T>) -> Self {
        Self { name, tx }
    }

    /// Configured queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push `value`, blocking at most `timeout` while the queue is full
    pub fn push(&self, value: T, timeout: Duration) -> Result<(), PushError<T>> {
        self.tx.send_timeout(value, timeout).map_err(|e| match e {
            SendTimeoutError::Timeout(v) => PushError::Timeout(v),
            SendTimeoutError::Disconnected(v) => PushError::Disconnected(v),
        })
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Reading end of a named queue
pub struct QueueSource<T> {
    name: Arc<str>,
    rx: Receiver<T>,
}

impl<T> Clone for QueueSource<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> fmt::Debug for QueueSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueSource")
            .field("name", &self.name)
            .field("len", &self.rx.len())
            .field("capacity", &self.rx.capacity())
            .finish()
    }
}

impl<T> QueueSource<T> {
    pub(crate) fn new(name: Arc<str>, rx: Receiver<T>) -> Self {
        Self { name, rx }
    }

    /// Configured queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pop the oldest item, blocking at most `timeout` while the queue is empty
    pub fn pop(&self, timeout: Duration) -> Result<T, PopError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => PopError::Timeout,
            RecvTimeoutError::Disconnected => PopError::Disconnected,
        })
    }

    /// Pop without blocking
    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create an unregistered sink/source pair
///
/// Mostly useful in tests; modules get their endpoints from the registry.
pub fn bounded<T>(name: &str, capacity: usize) -> (QueueSink<T>, QueueSource<T>) {
    let name: Arc<str> = Arc::from(name);
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (QueueSink::new(name.clone(), tx), QueueSource::new(name, rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_fifo() {
        let (sink, source) = bounded::<u32>("numbers", 4);
        for i in 0..3 {
            sink.push(i, Duration::from_millis(10)).unwrap();
        }
        assert_eq!(source.len(), 3);
        for i in 0..3 {
            assert_eq!(source.pop(Duration::from_millis(10)), Ok(i));
        }
        assert!(source.is_empty());
    }

    #[test]
    fn test_push_timeout_returns_value() {
        let (sink, _source) = bounded::<&str>("full", 1);
        sink.push("first", Duration::from_millis(10)).unwrap();
        let err = sink.push("second", Duration::from_millis(10)).unwrap_err();
        assert_eq!(err, PushError::Timeout("second"));
        assert_eq!(err.into_inner(), "second");
    }

    #[test]
    fn test_pop_timeout_on_empty() {
        let (_sink, source) = bounded::<u8>("empty", 1);
        assert_eq!(source.pop(Duration::from_millis(10)), Err(PopError::Timeout));
        assert_eq!(source.try_pop(), None);
    }

    #[test]
    fn test_disconnected_ends() {
        let (sink, source) = bounded::<u8>("orphan", 1);
        drop(source);
        assert!(matches!(
            sink.push(1, Duration::from_millis(10)),
            Err(PushError::Disconnected(1))
        ));

        let (sink, source) = bounded::<u8>("orphan", 1);
        drop(sink);
        assert_eq!(
            source.pop(Duration::from_millis(10)),
            Err(PopError::Disconnected)
        );
    }

    #[test]
    fn test_endpoint_names() {
        let (sink, source) = bounded::<u8>("reversed", 1);
        assert_eq!(sink.name(), "reversed");
        assert_eq!(source.name(), "reversed");
        assert!(format!("{:?}", sink).contains("reversed"));
    }
}
