//! Configuration provider interface
//!
//! The watcher supervisor reads the current configuration from a
//! [`ConfigProvider`] and waits on a single-shot change signal. After the
//! signal fires the consumer subscribes again before re-reading.

use std::sync::{Mutex, RwLock};

use tokio::sync::oneshot;

use crate::config::AppConfig;

pub trait ConfigProvider: Send + Sync {
    /// Snapshot of the current configuration.
    fn current(&self) -> AppConfig;

    /// Resolves once, the next time the configuration changes.
    fn subscribe(&self) -> oneshot::Receiver<()>;
}

/// In-memory configuration with change notification.
pub struct SharedConfig {
    config: RwLock<AppConfig>,
    listeners: Mutex<Vec<oneshot::Sender<()>>>,
}

impl SharedConfig {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Swap in a new configuration and notify every subscriber.
    pub fn replace(&self, config: AppConfig) {
        {
            let mut current = self.config.write().unwrap_or_else(|e| e.into_inner());
            *current = config;
        }

        let listeners: Vec<_> = {
            let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners.drain(..).collect()
        };

        tracing::debug!(
            subscribers = listeners.len(),
            "Configuration replaced, notifying subscribers"
        );

        for listener in listeners {
            // A dropped receiver just means nobody is waiting any more
            let _ = listener.send(());
        }
    }
}

impl ConfigProvider for SharedConfig {
    fn current(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn subscribe(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.retain(|listener| !listener.is_closed());
        listeners.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchConfig;

    #[tokio::test]
    async fn test_replace_fires_subscription_once() {
        let shared = SharedConfig::new(AppConfig::default());
        let changed = shared.subscribe();

        let mut next = AppConfig::default();
        next.watchers.push(WatchConfig::new("/tmp/a", "https://example.test"));
        shared.replace(next.clone());

        assert!(changed.await.is_ok());
        assert_eq!(shared.current(), next);

        // The old subscription is spent; a fresh one waits for the next change
        let mut again = shared.subscribe();
        assert!(again.try_recv().is_err());
        shared.replace(AppConfig::default());
        assert!(again.await.is_ok());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let shared = SharedConfig::new(AppConfig::default());
        for _ in 0..10 {
            drop(shared.subscribe());
        }
        let _live = shared.subscribe();
        assert_eq!(shared.listeners.lock().unwrap().len(), 1);
    }
}
