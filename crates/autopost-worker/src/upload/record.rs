use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use autopost_core::{FailureReason, UploadId, UploadState, UploadSummary, WatchConfig};
use autopost_infra::Delivered;
use autopost_processing::ImageStore;
use chrono::{DateTime, Utc};

/// Lifecycle record of one discovered file.
///
/// Webhook and username are captured from the watch configuration at
/// discovery time and never change afterwards.
#[derive(Debug)]
pub struct UploadRecord {
    id: UploadId,
    original_file: PathBuf,
    store: Arc<Mutex<ImageStore>>,
    webhook_url: String,
    username: Option<String>,
    state: UploadState,
    failure: Option<FailureReason>,
    edited: bool,
    url: Option<String>,
    width: u32,
    height: u32,
    discovered_at: DateTime<Utc>,
    uploaded_at: Option<DateTime<Utc>>,
}

impl UploadRecord {
    pub(crate) fn new(id: UploadId, original_file: PathBuf, store: ImageStore, watch: &WatchConfig) -> Self {
        let state = if watch.hold_uploads {
            UploadState::Pending
        } else {
            UploadState::Queued
        };

        Self {
            id,
            original_file,
            store: Arc::new(Mutex::new(store)),
            webhook_url: watch.webhook_url.trim().to_string(),
            username: watch.username_override().map(str::to_string),
            state,
            failure: None,
            edited: false,
            url: None,
            width: 0,
            height: 0,
            discovered_at: Utc::now(),
            uploaded_at: None,
        }
    }

    pub fn id(&self) -> UploadId {
        self.id
    }

    pub fn original_file(&self) -> &Path {
        &self.original_file
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        self.failure.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn discovered_at(&self) -> DateTime<Utc> {
        self.discovered_at
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.uploaded_at
    }

    /// True once a replacement image has been attached.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn summary(&self) -> UploadSummary {
        UploadSummary {
            id: self.id,
            original_file: self.original_file.clone(),
            edited: self.edited,
            state: self.state,
            failure: self.failure.clone(),
            url: self.url.clone(),
            width: self.width,
            height: self.height,
            discovered_at: self.discovered_at,
            uploaded_at: self.uploaded_at,
        }
    }

    pub(crate) fn store(&self) -> Arc<Mutex<ImageStore>> {
        Arc::clone(&self.store)
    }

    pub(crate) fn set_state(&mut self, state: UploadState) {
        self.state = state;
    }

    pub(crate) fn mark_edited(&mut self) {
        self.edited = true;
    }

    pub(crate) fn complete(&mut self, delivered: &Delivered) {
        self.state = UploadState::Complete;
        self.failure = None;
        self.url = Some(delivered.attachment.url.clone());
        self.width = delivered.attachment.width;
        self.height = delivered.attachment.height;
        self.uploaded_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, reason: FailureReason) {
        self.state = UploadState::Failed;
        self.failure = Some(reason);
    }
}

/// Lock an image store, recovering from a poisoned lock.
pub(crate) fn lock_store(store: &Mutex<ImageStore>) -> MutexGuard<'_, ImageStore> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_follows_hold_flag() {
        let mut watch = WatchConfig::new("/shots", " https://hooks.example.test/1 ");
        let record = UploadRecord::new(
            UploadId(1),
            "/shots/a.png".into(),
            ImageStore::new("/shots/a.png", 8_000_000, true),
            &watch,
        );
        assert_eq!(record.state(), UploadState::Queued);
        assert_eq!(record.webhook_url(), "https://hooks.example.test/1");
        assert_eq!(record.username(), None);

        watch.hold_uploads = true;
        watch.username = Some("bot".into());
        let record = UploadRecord::new(
            UploadId(2),
            "/shots/b.png".into(),
            ImageStore::new("/shots/b.png", 8_000_000, true),
            &watch,
        );
        assert_eq!(record.state(), UploadState::Pending);
        assert_eq!(record.username(), Some("bot"));

        let summary = record.summary();
        assert_eq!(summary.id, UploadId(2));
        assert!(!summary.edited);
        assert!(summary.url.is_none());
    }
}
