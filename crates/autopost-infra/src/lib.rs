//! Autopost Infrastructure Library
//!
//! This crate provides the plumbing shared by the watcher and the binary:
//! - Telemetry initialization (tracing subscriber with pluggable log sinks)
//! - In-memory log ring buffer for the dashboard
//! - Webhook delivery client and retry policy

pub mod delivery;
pub mod logging;
pub mod telemetry;

pub use delivery::{
    Attachment, Delivered, DeliveryClient, DeliveryConfig, DeliveryError, DeliveryPayload,
    RetryPolicy,
};
pub use logging::{LogSink, MemorySink, SinkLayer};
pub use telemetry::{init_telemetry, shutdown_telemetry};
