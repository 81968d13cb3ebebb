//! Watcher supervisor
//!
//! Runs one scanner task per configured directory. Any configuration change
//! stops every task and starts a fresh set from the new configuration; there
//! is no diffing. Uploads already being delivered finish regardless, since
//! tasks only check for cancellation between scan cycles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use autopost_core::{ConfigProvider, WatchConfig};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;
use crate::scanner::DirectoryScanner;
use crate::upload::Uploader;

pub struct WatcherSupervisor {
    provider: Arc<dyn ConfigProvider>,
    uploader: Arc<Uploader>,
}

impl WatcherSupervisor {
    pub fn new(provider: Arc<dyn ConfigProvider>, uploader: Arc<Uploader>) -> Self {
        Self { provider, uploader }
    }

    /// Supervise watchers until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut generation: u64 = 0;

        loop {
            // Subscribe before reading so a change in between is not lost
            let changed = self.provider.subscribe();
            let config = self.provider.current();
            let interval = config.watch_interval();
            let workers = shutdown.child_token();
            generation += 1;

            tracing::info!(
                generation,
                watchers = config.watchers.len(),
                interval_secs = interval.as_secs(),
                "Starting directory watchers"
            );

            for watch in config.watchers {
                tokio::spawn(watch_directory(
                    watch,
                    interval,
                    Arc::clone(&self.uploader),
                    workers.clone(),
                ));
            }

            let restart = tokio::select! {
                result = changed => result.is_ok(),
                _ = shutdown.cancelled() => false,
            };

            if !restart && !shutdown.is_cancelled() {
                tracing::debug!("Configuration provider closed, watchers run until shutdown");
                shutdown.cancelled().await;
            }

            // Old tasks are detached, not awaited; each stops after its current cycle
            workers.cancel();

            if !restart {
                break;
            }
            tracing::info!(generation, "Configuration changed, restarting watchers");
        }

        tracing::info!("Watcher supervisor stopped");
    }
}

#[tracing::instrument(skip_all, fields(path = %watch.path.display()))]
async fn watch_directory(
    watch: WatchConfig,
    interval: Duration,
    uploader: Arc<Uploader>,
    cancel: CancellationToken,
) {
    tracing::info!("Watching directory");
    let mut scanner = DirectoryScanner::new(watch.clone());

    loop {
        let scanned = tokio::task::spawn_blocking(move || {
            let result = scanner.scan();
            (scanner, result)
        })
        .await;

        let (returned, files) = settle_scan(scanned, &watch);
        scanner = returned;
        for file in files {
            uploader.add_file(file, &watch).await;
        }

        uploader.drain_queued().await;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("Stopped watching directory");
}

/// Turn the outcome of a blocking scan into the scanner to keep and the files
/// to register. A scan that panicked is replaced by a fresh scanner so the
/// watcher keeps running.
fn settle_scan(
    scanned: Result<(DirectoryScanner, Result<Vec<PathBuf>, ScanError>), JoinError>,
    watch: &WatchConfig,
) -> (DirectoryScanner, Vec<PathBuf>) {
    match scanned {
        Ok((scanner, Ok(files))) => (scanner, files),
        Ok((scanner, Err(e))) => {
            tracing::warn!(error = %e, "Directory scan failed, will retry");
            (scanner, Vec::new())
        }
        Err(e) => {
            tracing::error!(error = %e, "Scan task aborted, restarting scanner");
            (DirectoryScanner::new(watch.clone()), Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicked_scan_gets_fresh_scanner() {
        let watch = WatchConfig::new("/shots", "");
        let scanned = tokio::task::spawn_blocking(
            || -> (DirectoryScanner, Result<Vec<PathBuf>, ScanError>) {
                panic!("scan blew up")
            },
        )
        .await;
        assert!(scanned.is_err());

        let (scanner, files) = settle_scan(scanned, &watch);
        assert!(files.is_empty());
        assert_eq!(scanner.config().path, watch.path);
    }

    #[tokio::test]
    async fn test_failed_scan_keeps_scanner() {
        let watch = WatchConfig::new("/definitely/not/here", "");
        let mut scanner = DirectoryScanner::new(watch.clone());
        let last_check = scanner.last_check();
        let result = scanner.scan();
        assert!(result.is_err());

        let (scanner, files) = settle_scan(Ok((scanner, result)), &watch);
        assert!(files.is_empty());
        assert_eq!(scanner.last_check(), last_check);
    }
}
