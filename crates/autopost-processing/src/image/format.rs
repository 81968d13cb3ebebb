use std::io::{Cursor, Seek, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::PrepareError;

/// Image formats accepted from the watched directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Gif,
}

impl SourceFormat {
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Gif => Some(SourceFormat::Gif),
            _ => None,
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Gif => ImageFormat::Gif,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Png => "png",
            SourceFormat::Jpeg => "jpg",
            SourceFormat::Gif => "gif",
        }
    }

    /// Filename the webhook sees for this format.
    pub fn upload_filename(&self) -> String {
        format!("image.{}", self.extension())
    }

    /// GIFs are forwarded byte-for-byte so animations survive.
    pub fn is_transformable(&self) -> bool {
        !matches!(self, SourceFormat::Gif)
    }

    /// Encode `img` in this format.
    pub fn encode<W: Write + Seek>(
        &self,
        img: &DynamicImage,
        writer: &mut W,
    ) -> Result<(), PrepareError> {
        match self {
            SourceFormat::Jpeg => {
                // JPEG has no alpha channel
                DynamicImage::ImageRgb8(img.to_rgb8())
                    .write_to(writer, ImageFormat::Jpeg)
                    .map_err(PrepareError::Encode)
            }
            SourceFormat::Png => img
                .write_to(writer, ImageFormat::Png)
                .map_err(PrepareError::Encode),
            SourceFormat::Gif => Err(PrepareError::UnsupportedFormat(
                "gif images are not re-encoded".to_string(),
            )),
        }
    }
}

fn detect(format: Option<ImageFormat>) -> Result<SourceFormat, PrepareError> {
    let format = format
        .ok_or_else(|| PrepareError::UnsupportedFormat("unrecognised image data".to_string()))?;
    SourceFormat::from_image_format(format)
        .ok_or_else(|| PrepareError::UnsupportedFormat(format!("{:?}", format).to_lowercase()))
}

/// Sniff and fully decode an image file.
pub(crate) fn decode_file(path: &Path) -> Result<(DynamicImage, SourceFormat), PrepareError> {
    let reader = ImageReader::open(path)
        .map_err(PrepareError::io(path))?
        .with_guessed_format()
        .map_err(PrepareError::io(path))?;
    let format = detect(reader.format())?;
    let img = reader.decode().map_err(|source| PrepareError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((img, format))
}

/// Sniff and fully decode in-memory image data.
pub(crate) fn decode_bytes(data: &[u8]) -> Result<(DynamicImage, SourceFormat), PrepareError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PrepareError::DecodeBytes(e.into()))?;
    let format = detect(reader.format())?;
    let img = reader.decode().map_err(PrepareError::DecodeBytes)?;
    Ok((img, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(4, 3);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_upload_filenames() {
        assert_eq!(SourceFormat::Png.upload_filename(), "image.png");
        assert_eq!(SourceFormat::Jpeg.upload_filename(), "image.jpg");
        assert_eq!(SourceFormat::Gif.upload_filename(), "image.gif");
    }

    #[test]
    fn test_decode_bytes_detects_format_from_content() {
        let (img, format) = decode_bytes(&encoded(ImageFormat::Png)).unwrap();
        assert_eq!(format, SourceFormat::Png);
        assert_eq!((img.width(), img.height()), (4, 3));

        let (_, format) = decode_bytes(&encoded(ImageFormat::Gif)).unwrap();
        assert_eq!(format, SourceFormat::Gif);
    }

    #[test]
    fn test_decode_bytes_rejects_garbage() {
        let err = decode_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PrepareError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_jpeg_encode_drops_alpha() {
        let img = DynamicImage::new_rgba8(8, 8);
        let mut buf = Cursor::new(Vec::new());
        SourceFormat::Jpeg.encode(&img, &mut buf).unwrap();
        let (decoded, format) = decode_bytes(buf.get_ref()).unwrap();
        assert_eq!(format, SourceFormat::Jpeg);
        assert_eq!(decoded.width(), 8);
    }

    #[test]
    fn test_gif_is_never_encoded() {
        let img = DynamicImage::new_rgb8(2, 2);
        let mut buf = Cursor::new(Vec::new());
        assert!(SourceFormat::Gif.encode(&img, &mut buf).is_err());
        assert!(!SourceFormat::Gif.is_transformable());
        assert!(SourceFormat::Png.is_transformable());
    }
}
