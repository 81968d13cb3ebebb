//! Image processing module
//!
//! This module provides the image steps of upload preparation:
//! - Format detection and encoding (format)
//! - Fit-to-budget resizing (resize)
//! - Caption watermarking (watermark)
//! - Review thumbnails (thumbnail)

pub mod format;
pub mod resize;
pub mod thumbnail;
pub mod watermark;

pub use format::SourceFormat;
pub use resize::ImageResize;
pub use thumbnail::{render_thumbnail, ThumbnailKind, THUMBNAIL_SIZE};
pub use watermark::{Watermark, WatermarkConfig, WATERMARK_CAPTION};

pub(crate) use format::{decode_bytes, decode_file};
