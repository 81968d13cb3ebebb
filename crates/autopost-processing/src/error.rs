use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while preparing an image for upload.
///
/// None of these are worth retrying: the same file will fail the same way.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not decode image data: {0}")]
    DecodeBytes(#[source] image::ImageError),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to resize: was {before}, now {after}, needed {target}")]
    Sizing { before: u64, after: u64, target: u64 },

    #[error("gif is {size} bytes, over the {target} byte limit, and gifs are never resized")]
    OversizedGif { size: u64, target: u64 },

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("could not write temporary file: {0}")]
    TempFile(#[source] io::Error),

    #[error("invalid edited image: {0}")]
    InvalidEdit(String),

    #[error("no edited image attached")]
    NoEditedImage,
}

impl PrepareError {
    /// True when the image is valid but cannot be brought under the byte budget.
    pub fn is_sizing(&self) -> bool {
        matches!(
            self,
            PrepareError::Sizing { .. } | PrepareError::OversizedGif { .. }
        )
    }

    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> PrepareError + '_ {
        move |source| PrepareError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_message_includes_byte_counts() {
        let err = PrepareError::Sizing {
            before: 12_000_000,
            after: 8_100_000,
            target: 8_000_000,
        };
        assert_eq!(
            err.to_string(),
            "failed to resize: was 12000000, now 8100000, needed 8000000"
        );
        assert!(err.is_sizing());
        assert!(!PrepareError::UnsupportedFormat("bmp".into()).is_sizing());
    }
}
