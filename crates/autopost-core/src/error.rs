//! Error types module
//!
//! `AppError` is what the outward-facing operations of the uploader return to
//! the review/inspection collaborator. Failures that happen while an upload is
//! being processed never surface here; they are recorded on the upload itself
//! as a [`crate::FailureReason`].

use std::io;

use crate::config::ConfigError;
use crate::models::{UploadId, UploadState};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload {id} is {state}, expected {expected}")]
    InvalidState {
        id: UploadId,
        state: UploadState,
        expected: UploadState,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upload_not_found(id: UploadId) -> Self {
        AppError::NotFound(format!("upload {} does not exist", id))
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}
