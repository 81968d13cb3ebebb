use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use autopost_core::{
    AppError, UploadId, UploadState, UploadSummary, WatchConfig, MAX_UPLOAD_BYTES,
};
use autopost_infra::{DeliveryClient, DeliveryConfig, DeliveryError, RetryPolicy};
use autopost_processing::{decode_data_url, ImageStore, ThumbnailKind};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::deliver::deliver;
use super::record::{lock_store, UploadRecord};
use crate::error::review_error;

/// Configuration for the uploader
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Byte budget every prepared image must fit.
    pub max_bytes: u64,
    /// Where derived images are written; the system temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub delivery: DeliveryConfig,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            scratch_dir: None,
            retry: RetryPolicy::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

/// Thread-safe collection of upload records.
///
/// Adding a record and draining the queue take the same lock, so a file added
/// during a drain is either fully part of it or waits for the next one.
/// Records are kept for the life of the process.
pub struct Uploader {
    records: Mutex<Vec<UploadRecord>>,
    next_id: AtomicU32,
    client: DeliveryClient,
    config: UploaderConfig,
}

impl Uploader {
    pub fn new(config: UploaderConfig) -> Result<Self, DeliveryError> {
        let client = DeliveryClient::new(config.delivery.clone())?;
        Ok(Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
            client,
            config,
        })
    }

    /// Register a newly discovered file. Initial state is `Pending` when the
    /// directory holds uploads for review, `Queued` otherwise.
    pub async fn add_file(&self, path: impl Into<PathBuf>, watch: &WatchConfig) -> UploadId {
        let path = path.into();
        let mut store = ImageStore::new(&path, self.config.max_bytes, watch.watermark);
        if let Some(dir) = &self.config.scratch_dir {
            store = store.with_scratch_dir(dir);
        }

        let mut records = self.records.lock().await;
        // Allocated under the lock so id order matches insertion order
        let id = UploadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = UploadRecord::new(id, path, store, watch);

        tracing::info!(
            upload_id = %id,
            file = %record.original_file().display(),
            state = %record.state(),
            "New file discovered"
        );

        records.push(record);
        id
    }

    /// Deliver every `Queued` record, one at a time, holding the collection
    /// lock for the whole drain. Returns how many records left the queue.
    #[tracing::instrument(skip(self))]
    pub async fn drain_queued(&self) -> usize {
        let mut records = self.records.lock().await;
        let mut finished = 0;

        for record in records.iter_mut() {
            if record.state() != UploadState::Queued {
                continue;
            }
            deliver(record, &self.client, &self.config.retry).await;
            if record.state() != UploadState::Queued {
                finished += 1;
            }
        }

        if finished > 0 {
            tracing::debug!(finished, "Drained upload queue");
        }
        finished
    }

    /// Borrow a record. The collection stays locked while the guard lives.
    pub async fn lookup_by_id(
        &self,
        id: UploadId,
    ) -> Result<MappedMutexGuard<'_, UploadRecord>, AppError> {
        let records = self.records.lock().await;
        MutexGuard::try_map(records, |records| {
            records.iter_mut().find(|record| record.id() == id)
        })
        .map_err(|_| AppError::upload_not_found(id))
    }

    /// Snapshots of every record in creation order.
    pub async fn summaries(&self) -> Vec<UploadSummary> {
        let records = self.records.lock().await;
        records.iter().map(UploadRecord::summary).collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Approve a held upload: `Pending` to `Queued`.
    pub async fn start(&self, id: UploadId) -> Result<(), AppError> {
        self.review_transition(id, UploadState::Queued).await
    }

    /// Decline a held upload: `Pending` to `Skipped`.
    pub async fn skip(&self, id: UploadId) -> Result<(), AppError> {
        self.review_transition(id, UploadState::Skipped).await
    }

    async fn review_transition(&self, id: UploadId, to: UploadState) -> Result<(), AppError> {
        let mut record = self.lookup_by_id(id).await?;
        ensure_pending(&record)?;
        record.set_state(to);
        tracing::info!(upload_id = %id, state = %to, "Upload reviewed");
        Ok(())
    }

    /// Replace the image of a held upload with edited PNG or JPEG bytes.
    pub async fn attach_edited(&self, id: UploadId, data: Vec<u8>) -> Result<(), AppError> {
        let mut record = self.lookup_by_id(id).await?;
        ensure_pending(&record)?;

        let store = record.store();
        tokio::task::spawn_blocking(move || {
            let mut store = lock_store(&store);
            store.set_edited(&data)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| review_error(id, e))?;

        record.mark_edited();
        tracing::info!(upload_id = %id, "Attached edited image");
        Ok(())
    }

    /// [`Uploader::attach_edited`] for a `data:image/...;base64,` URL.
    pub async fn attach_edited_data_url(&self, id: UploadId, url: &str) -> Result<(), AppError> {
        let data = decode_data_url(url).map_err(|e| review_error(id, e))?;
        self.attach_edited(id, data).await
    }

    /// PNG thumbnail (at most 128x128) of the original or edited image.
    pub async fn thumbnail(&self, id: UploadId, kind: ThumbnailKind) -> Result<Vec<u8>, AppError> {
        let store = self.lookup_by_id(id).await?.store();
        tokio::task::spawn_blocking(move || {
            let store = lock_store(&store);
            store.thumbnail(kind)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| review_error(id, e))
    }

    /// The untouched source image.
    pub async fn original_bytes(&self, id: UploadId) -> Result<Vec<u8>, AppError> {
        let store = self.lookup_by_id(id).await?.store();
        tokio::task::spawn_blocking(move || {
            let store = lock_store(&store);
            store.original_bytes()
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| review_error(id, e))
    }
}

fn ensure_pending(record: &UploadRecord) -> Result<(), AppError> {
    if record.state() != UploadState::Pending {
        return Err(AppError::InvalidState {
            id: record.id(),
            state: record.state(),
            expected: UploadState::Pending,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploader() -> Uploader {
        Uploader::new(UploaderConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let uploader = uploader();
        let watch = WatchConfig::new("/shots", "");
        let a = uploader.add_file("/shots/a.png", &watch).await;
        let b = uploader.add_file("/shots/b.png", &watch).await;
        assert_eq!(a, UploadId(1));
        assert_eq!(b, UploadId(2));
        assert_eq!(uploader.len().await, 2);
    }

    #[tokio::test]
    async fn test_separate_uploaders_do_not_share_ids() {
        let watch = WatchConfig::new("/shots", "");
        let first = uploader();
        let second = uploader();
        first.add_file("/shots/a.png", &watch).await;
        first.add_file("/shots/b.png", &watch).await;
        assert_eq!(second.add_file("/shots/c.png", &watch).await, UploadId(1));
    }

    #[tokio::test]
    async fn test_lookup_unknown_id() {
        let uploader = uploader();
        let err = uploader.lookup_by_id(UploadId(99)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_webhook_keeps_record_queued() {
        let uploader = uploader();
        let watch = WatchConfig::new("/shots", "   ");
        let id = uploader.add_file("/shots/a.png", &watch).await;

        assert_eq!(uploader.drain_queued().await, 0);
        assert_eq!(
            uploader.lookup_by_id(id).await.unwrap().state(),
            UploadState::Queued
        );
    }

    #[tokio::test]
    async fn test_review_transitions_only_from_pending() {
        let uploader = uploader();
        let mut watch = WatchConfig::new("/shots", "");
        watch.hold_uploads = true;
        let held = uploader.add_file("/shots/a.png", &watch).await;
        let declined = uploader.add_file("/shots/b.png", &watch).await;

        uploader.start(held).await.unwrap();
        uploader.skip(declined).await.unwrap();

        let err = uploader.start(declined).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidState {
                state: UploadState::Skipped,
                ..
            }
        ));
        assert!(uploader.skip(held).await.is_err());
        assert!(matches!(
            uploader.start(UploadId(42)).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_edited_thumbnail_without_edit_is_not_found() {
        let uploader = uploader();
        let id = uploader
            .add_file("/shots/a.png", &WatchConfig::new("/shots", ""))
            .await;
        let err = uploader
            .thumbnail(id, ThumbnailKind::Edited)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bad_data_url_is_invalid_input() {
        let uploader = uploader();
        let mut watch = WatchConfig::new("/shots", "");
        watch.hold_uploads = true;
        let id = uploader.add_file("/shots/a.png", &watch).await;
        let err = uploader
            .attach_edited_data_url(id, "data:text/plain;base64,aGVsbG8=")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
