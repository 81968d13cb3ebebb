use std::io;
use std::path::PathBuf;

use autopost_core::{AppError, UploadId};
use autopost_processing::PrepareError;

/// Errors from a single directory scan. All are recoverable: the next scan
/// re-examines the same window.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("watch path {} does not exist", .0.display())]
    MissingPath(PathBuf),

    #[error("watch path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("could not stat {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Map an image error raised on behalf of the review collaborator.
pub(crate) fn review_error(id: UploadId, err: PrepareError) -> AppError {
    match err {
        PrepareError::NoEditedImage => {
            AppError::NotFound(format!("upload {} has no edited image", id))
        }
        PrepareError::UnsupportedFormat(_)
        | PrepareError::DecodeBytes(_)
        | PrepareError::InvalidEdit(_) => AppError::InvalidInput(err.to_string()),
        other => AppError::ImageProcessing(other.to_string()),
    }
}
