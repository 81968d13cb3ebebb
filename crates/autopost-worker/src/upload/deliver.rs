use autopost_core::FailureReason;
use autopost_infra::{Delivered, DeliveryClient, DeliveryPayload, RetryPolicy};
use autopost_processing::{PrepareError, PreparedUpload};

use super::record::{lock_store, UploadRecord};

/// Run one full delivery for a `Queued` record.
///
/// On return the record is `Complete` or `Failed`, except when no webhook is
/// configured: then it stays `Queued` for the next drain. Image store cleanup
/// runs after every attempt loop.
#[tracing::instrument(skip_all, fields(upload_id = %record.id(), file = %record.original_file().display()))]
pub(crate) async fn deliver(record: &mut UploadRecord, client: &DeliveryClient, retry: &RetryPolicy) {
    if record.webhook_url().is_empty() {
        tracing::error!("No webhook configured for this directory, leaving upload queued");
        return;
    }

    let store = record.store();
    let prepared = tokio::task::spawn_blocking(move || {
        let mut store = lock_store(&store);
        store.prepare()
    })
    .await;

    let outcome = match prepared {
        Ok(Ok(prepared)) => send_with_retries(record, client, retry, prepared).await,
        Ok(Err(e)) => Err(prepare_failure(e)),
        Err(e) => Err(FailureReason::InvalidImage(format!(
            "image preparation aborted: {}",
            e
        ))),
    };

    match outcome {
        Ok(delivered) => {
            record.complete(&delivered);
            tracing::info!(
                url = %delivered.attachment.url,
                width = delivered.attachment.width,
                height = delivered.attachment.height,
                "Upload complete"
            );
        }
        Err(reason) => {
            tracing::error!(reason = %reason, "Upload failed");
            record.fail(reason);
        }
    }

    let store = record.store();
    lock_store(&store).cleanup();
}

async fn send_with_retries(
    record: &UploadRecord,
    client: &DeliveryClient,
    retry: &RetryPolicy,
    prepared: PreparedUpload,
) -> Result<Delivered, FailureReason> {
    let payload = DeliveryPayload {
        bytes: prepared.bytes,
        filename: prepared.filename,
        username: record.username().map(str::to_string),
    };

    let mut remaining = retry.max_attempts;
    while remaining > 0 {
        match client.send(record.webhook_url(), &payload).await {
            Ok(delivered) => return Ok(delivered),
            Err(e) if !e.is_retryable() => {
                tracing::warn!(error = %e, "Webhook rejected upload, not retrying");
                return Err(FailureReason::TooLarge);
            }
            Err(e) => {
                remaining -= 1;
                tracing::warn!(error = %e, attempts_left = remaining, "Delivery attempt failed");
                if let Some(delay) = retry.backoff(remaining) {
                    tracing::debug!(delay_secs = delay.as_secs_f64(), "Backing off before retry");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(FailureReason::ExhaustedRetries)
}

fn prepare_failure(err: PrepareError) -> FailureReason {
    if err.is_sizing() {
        FailureReason::Oversized(err.to_string())
    } else {
        FailureReason::InvalidImage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_failures_are_classified() {
        let sizing = prepare_failure(PrepareError::Sizing {
            before: 10,
            after: 9,
            target: 5,
        });
        assert!(matches!(sizing, FailureReason::Oversized(_)));

        let gif = prepare_failure(PrepareError::OversizedGif { size: 10, target: 5 });
        assert!(matches!(gif, FailureReason::Oversized(_)));

        let bad = prepare_failure(PrepareError::UnsupportedFormat("bmp".into()));
        assert!(matches!(bad, FailureReason::InvalidImage(_)));
    }
}
