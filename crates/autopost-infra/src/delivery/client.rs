use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use super::error::DeliveryError;
use super::response::{Attachment, WebhookMessage};

/// Configuration for the delivery client
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("autopost/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One image ready to post.
#[derive(Debug, Clone)]
pub struct DeliveryPayload {
    pub bytes: Bytes,
    pub filename: String,
    pub username: Option<String>,
}

/// A successful delivery.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub message_id: Option<u64>,
    pub attachment: Attachment,
    pub elapsed: Duration,
}

/// Posts images to a webhook as multipart forms.
#[derive(Clone)]
pub struct DeliveryClient {
    http_client: Client,
}

impl DeliveryClient {
    pub fn new(config: DeliveryConfig) -> Result<Self, DeliveryError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { http_client })
    }

    /// Make one delivery attempt.
    ///
    /// Only a 200 with at least one attachment counts as success.
    #[tracing::instrument(skip(self, payload), fields(filename = %payload.filename, bytes = payload.bytes.len()))]
    pub async fn send(
        &self,
        url: &str,
        payload: &DeliveryPayload,
    ) -> Result<Delivered, DeliveryError> {
        let started = Instant::now();

        let part = Part::bytes(payload.bytes.to_vec()).file_name(payload.filename.clone());
        let mut form = Form::new().part("file", part);
        if let Some(username) = &payload.username {
            form = form.text("username", username.clone());
        }

        let response = self.http_client.post(url).multipart(form).send().await?;
        let status = response.status();

        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Err(DeliveryError::TooLarge);
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let message: WebhookMessage = serde_json::from_slice(&body)?;
        let attachment = message
            .attachments
            .into_iter()
            .next()
            .ok_or(DeliveryError::NoAttachments)?;

        let elapsed = started.elapsed();
        let secs = elapsed.as_secs_f64();
        let rate_kib = if secs > 0.0 {
            payload.bytes.len() as f64 / 1024.0 / secs
        } else {
            0.0
        };

        tracing::info!(
            url = %attachment.url,
            width = attachment.width,
            height = attachment.height,
            message_id = ?message.id,
            bytes = payload.bytes.len(),
            elapsed_secs = %format!("{:.3}", secs),
            rate_kib_s = %format!("{:.1}", rate_kib),
            "Delivered image"
        );

        Ok(Delivered {
            message_id: message.id,
            attachment,
            elapsed,
        })
    }
}
