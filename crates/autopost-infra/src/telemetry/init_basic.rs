use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::logging::{LogSink, SinkLayer};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "autopost=info";

/// Initialize tracing with stdout output plus every sink in `sinks`.
///
/// `RUST_LOG` overrides `default_filter`. Fails if a global subscriber is
/// already installed.
pub fn init_telemetry(
    default_filter: Option<&str>,
    sinks: Vec<Arc<dyn LogSink>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = default_filter.unwrap_or(DEFAULT_FILTER).to_string();
    let sink_count = sinks.len();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(SinkLayer::new(sinks))
        .try_init()?;

    tracing::debug!(sinks = sink_count, "Telemetry initialized");
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
