//! Webhook delivery
//!
//! [`DeliveryClient`] performs a single multipart POST and classifies the
//! outcome; [`RetryPolicy`] decides how many attempts to make and how long to
//! wait between them. The retry loop itself belongs to the caller.

mod client;
mod error;
mod response;
mod retry;

pub use client::{Delivered, DeliveryClient, DeliveryConfig, DeliveryPayload};
pub use error::DeliveryError;
pub use response::{Attachment, WebhookMessage};
pub use retry::RetryPolicy;
