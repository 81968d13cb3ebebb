//! Image preparation for screenshot uploads
//!
//! The [`ImageStore`] owns one source image plus the chain of temporary files
//! produced while making it fit an upload budget:
//! - format detection (PNG, JPEG; GIF passes through untouched)
//! - one-pass resize to fit a byte budget
//! - watermark caption burned into the bottom-left corner
//! - optional edited replacement image and thumbnails for review

pub mod edit;
pub mod error;
pub mod image;
pub mod store;

pub use edit::decode_data_url;
pub use error::PrepareError;
pub use crate::image::{ImageResize, SourceFormat, ThumbnailKind, Watermark, WatermarkConfig};
pub use store::{ImageStore, PreparedUpload};
