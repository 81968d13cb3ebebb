//! Telemetry initialization
//!
//! Installs the global tracing subscriber: an env-driven filter, a stdout
//! formatter, and a [`crate::logging::SinkLayer`] feeding registered log sinks.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry};
