//! autopost: watch screenshot directories and post new images to a webhook.
//!
//! Configuration comes from `--config FILE` or `AUTOPOST_CONFIG`. On unix,
//! SIGHUP reloads it and restarts every watcher. Ctrl-C stops the process.

use std::sync::Arc;

use anyhow::Context;
use autopost_cli::{load_config, resolve_config, Cli};
use autopost_core::{ConfigProvider, SharedConfig, UploadState};
use autopost_infra::{init_telemetry, shutdown_telemetry, LogSink, MemorySink};
use autopost_worker::{Uploader, UploaderConfig, WatcherSupervisor};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Loaded before telemetry so the log buffer can be sized from it
    let config = load_config(&cli)?;
    let memory = Arc::new(MemorySink::new(config.log_buffer_size));
    init_telemetry(None, vec![Arc::clone(&memory) as Arc<dyn LogSink>])
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    config.validate().context("Invalid configuration")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        watchers = config.watchers.len(),
        interval_secs = config.watch_interval_secs,
        "Starting autopost"
    );

    let shared = Arc::new(SharedConfig::new(config));
    let uploader = Arc::new(
        Uploader::new(UploaderConfig {
            scratch_dir: cli.scratch_dir.clone(),
            ..UploaderConfig::default()
        })
        .context("Failed to create HTTP client")?,
    );

    let shutdown = CancellationToken::new();
    let supervisor = WatcherSupervisor::new(
        Arc::clone(&shared) as Arc<dyn ConfigProvider>,
        Arc::clone(&uploader),
    );
    let token = shutdown.clone();
    let supervisor_task = tokio::spawn(async move { supervisor.run(token).await });

    #[cfg(unix)]
    spawn_reload_on_hangup(cli.clone(), Arc::clone(&shared), shutdown.clone())?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");

    shutdown.cancel();
    supervisor_task.await.context("Watcher supervisor panicked")?;

    let summaries = uploader.summaries().await;
    let count = |state: UploadState| summaries.iter().filter(|s| s.state == state).count();
    tracing::info!(
        uploads = summaries.len(),
        complete = count(UploadState::Complete),
        failed = count(UploadState::Failed),
        pending = count(UploadState::Pending) + count(UploadState::Queued),
        "Autopost stopped"
    );

    shutdown_telemetry().await;

    if cli.print_log {
        print!("{}", memory.render_text(cli.debug_log));
    }
    Ok(())
}

/// Re-read the configuration on every SIGHUP. A bad file is logged and the
/// running configuration is kept.
#[cfg(unix)]
fn spawn_reload_on_hangup(
    cli: Cli,
    shared: Arc<SharedConfig>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    match resolve_config(&cli) {
                        Ok(config) => {
                            tracing::info!(watchers = config.watchers.len(), "Reloaded configuration");
                            shared.replace(config);
                        }
                        Err(e) => {
                            tracing::error!(error = %format!("{:#}", e), "Failed to reload configuration, keeping current one");
                        }
                    }
                }
            }
        }
    });

    Ok(())
}
