/// Outcome of a failed delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("file too large")]
    TooLarge,

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response contained no attachments")]
    NoAttachments,
}

impl DeliveryError {
    /// Only a 413 rules out another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DeliveryError::TooLarge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_too_large_is_fatal() {
        assert!(!DeliveryError::TooLarge.is_retryable());
        assert!(DeliveryError::NoAttachments.is_retryable());
        assert!(DeliveryError::Status {
            status: 500,
            body: String::new()
        }
        .is_retryable());

        let malformed: DeliveryError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(malformed.is_retryable());
    }
}
