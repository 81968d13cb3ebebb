use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;

use crate::error::PrepareError;

/// Thumbnails fit inside a square of this many pixels.
pub const THUMBNAIL_SIZE: u32 = 128;

/// Which image of an upload to preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailKind {
    Original,
    Edited,
}

/// Render `path` as a PNG thumbnail, preserving aspect ratio.
pub fn render_thumbnail(path: &Path) -> Result<Vec<u8>, PrepareError> {
    let (img, _) = super::decode_file(path)?;
    let thumb = img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE);

    let mut buf = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(PrepareError::Encode)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView};

    #[test]
    fn test_thumbnail_fits_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.jpg");
        DynamicImage::new_rgb8(1024, 512).save(&path).unwrap();

        let png = render_thumbnail(&path).unwrap();
        let thumb = image::load_from_memory(&png).unwrap();
        assert_eq!(thumb.dimensions(), (128, 64));
    }

    #[test]
    fn test_thumbnail_of_missing_file() {
        let err = render_thumbnail(Path::new("/nonexistent/shot.png")).unwrap_err();
        assert!(matches!(err, PrepareError::Io { .. }));
    }
}
