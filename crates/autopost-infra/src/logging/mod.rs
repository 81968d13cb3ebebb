//! Log sinks
//!
//! A [`LogSink`] receives every log event as a [`LogEntry`]. Sinks are
//! registered on the [`SinkLayer`] when telemetry is initialized; stdout output
//! is handled separately by the fmt layer.

mod layer;
mod memory;

use autopost_core::LogEntry;

pub use layer::SinkLayer;
pub use memory::{MemorySink, DEFAULT_LOG_CAPACITY};

/// Fire-and-forget destination for log entries.
pub trait LogSink: Send + Sync + 'static {
    fn write(&self, entry: &LogEntry);
}
