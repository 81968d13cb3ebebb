//! Per-upload image store
//!
//! Holds the original screenshot plus every temporary file derived from it.
//! The "current" file is the most recently derived one, falling back to the
//! edited replacement and then the original. Derived files live in a scratch
//! directory and are deleted by [`ImageStore::cleanup`]; the original never is.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use tempfile::TempPath;

use crate::error::PrepareError;
use crate::image::{
    decode_bytes, decode_file, render_thumbnail, ImageResize, SourceFormat, ThumbnailKind,
    Watermark, WatermarkConfig,
};

/// Bytes ready for delivery.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub bytes: Bytes,
    pub filename: String,
    pub format: SourceFormat,
}

pub struct ImageStore {
    original: PathBuf,
    edited: Option<TempPath>,
    derived: Vec<TempPath>,
    max_bytes: u64,
    watermark: Option<WatermarkConfig>,
    scratch_dir: PathBuf,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("original", &self.original)
            .field("edited", &self.edited())
            .field("derived", &self.derived.len())
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

impl ImageStore {
    pub fn new(original: impl Into<PathBuf>, max_bytes: u64, watermark: bool) -> Self {
        Self {
            original: original.into(),
            edited: None,
            derived: Vec::new(),
            max_bytes,
            watermark: watermark.then(WatermarkConfig::default),
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Directory derived files are written to. Defaults to the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn edited(&self) -> Option<&Path> {
        self.edited.as_deref()
    }

    pub fn has_edit(&self) -> bool {
        self.edited.is_some()
    }

    pub fn derived_files(&self) -> impl Iterator<Item = &Path> {
        self.derived.iter().map(|p| &**p)
    }

    /// Highest-priority existing file: newest derived, then edited, then original.
    pub fn current(&self) -> &Path {
        self.derived
            .last()
            .map(|p| &**p)
            .unwrap_or_else(|| self.base())
    }

    fn base(&self) -> &Path {
        self.edited.as_deref().unwrap_or(&self.original)
    }

    /// Replace the base image with caller-supplied PNG or JPEG bytes.
    pub fn set_edited(&mut self, data: &[u8]) -> Result<(), PrepareError> {
        let (_, format) = decode_bytes(data)?;
        if !format.is_transformable() {
            return Err(PrepareError::UnsupportedFormat(
                "edited image must be png or jpeg".to_string(),
            ));
        }

        let path = self.create_temp("edited", format, |file| {
            file.write_all(data).map_err(PrepareError::TempFile)
        })?;

        tracing::debug!(
            original = %self.original.display(),
            edited = %path.display(),
            bytes = data.len(),
            "Stored edited image"
        );

        // Dropping the previous TempPath deletes it
        self.edited = Some(path);
        Ok(())
    }

    /// Run format detection, resize and watermark, and return the bytes to send.
    pub fn prepare(&mut self) -> Result<PreparedUpload, PrepareError> {
        self.clear_derived();

        let (img, format) = decode_file(self.base())?;

        if !format.is_transformable() {
            return self.finish(format);
        }

        let img = self.resize(img, format)?;

        if let Some(config) = self.watermark.clone() {
            let marked = Watermark::apply(&img, &config);
            self.write_derived("watermark", format, &marked)?;
            tracing::debug!(file = %self.current().display(), "Applied watermark");
        }

        self.finish(format)
    }

    fn resize(
        &mut self,
        img: DynamicImage,
        format: SourceFormat,
    ) -> Result<DynamicImage, PrepareError> {
        let before = file_size(self.current())?;
        if before <= self.max_bytes {
            return Ok(img);
        }

        let (width, height) = img.dimensions();
        let (new_width, new_height) =
            ImageResize::dimensions_for_budget(width, height, before, self.max_bytes);
        tracing::info!(
            file = %self.current().display(),
            size = before,
            target = self.max_bytes,
            from = %format!("{}x{}", width, height),
            to = %format!("{}x{}", new_width, new_height),
            "Resizing image to fit upload limit"
        );

        let resized = ImageResize::scale_to(&img, new_width, new_height);
        self.write_derived("resize", format, &resized)?;

        let after = file_size(self.current())?;
        if after > self.max_bytes {
            return Err(PrepareError::Sizing {
                before,
                after,
                target: self.max_bytes,
            });
        }
        Ok(resized)
    }

    fn finish(&self, format: SourceFormat) -> Result<PreparedUpload, PrepareError> {
        let path = self.current();
        let data = fs::read(path).map_err(PrepareError::io(path))?;

        if !format.is_transformable() && data.len() as u64 > self.max_bytes {
            return Err(PrepareError::OversizedGif {
                size: data.len() as u64,
                target: self.max_bytes,
            });
        }

        Ok(PreparedUpload {
            bytes: Bytes::from(data),
            filename: format.upload_filename(),
            format,
        })
    }

    /// Delete every derived file and the edited image. The original stays.
    pub fn cleanup(&mut self) {
        self.clear_derived();
        if let Some(edited) = self.edited.take() {
            close_quietly(edited);
        }
    }

    fn clear_derived(&mut self) {
        for path in self.derived.drain(..) {
            close_quietly(path);
        }
    }

    /// PNG thumbnail of the original or the edited image.
    pub fn thumbnail(&self, kind: ThumbnailKind) -> Result<Vec<u8>, PrepareError> {
        match kind {
            ThumbnailKind::Original => render_thumbnail(&self.original),
            ThumbnailKind::Edited => {
                let edited = self.edited().ok_or(PrepareError::NoEditedImage)?;
                render_thumbnail(edited)
            }
        }
    }

    pub fn original_bytes(&self) -> Result<Vec<u8>, PrepareError> {
        fs::read(&self.original).map_err(PrepareError::io(&self.original))
    }

    fn write_derived(
        &mut self,
        label: &str,
        format: SourceFormat,
        img: &DynamicImage,
    ) -> Result<(), PrepareError> {
        let path = self.create_temp(label, format, |file| {
            let mut writer = BufWriter::new(file);
            format.encode(img, &mut writer)?;
            writer.flush().map_err(PrepareError::TempFile)
        })?;
        // Tracked before any size check so cleanup sees it either way
        self.derived.push(path);
        Ok(())
    }

    fn create_temp<F>(
        &self,
        label: &str,
        format: SourceFormat,
        write: F,
    ) -> Result<TempPath, PrepareError>
    where
        F: FnOnce(&mut File) -> Result<(), PrepareError>,
    {
        let prefix = format!("autopost_{}_", label);
        let suffix = format!(".{}", format.extension());
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)
            .map_err(PrepareError::TempFile)?;
        write(file.as_file_mut())?;
        Ok(file.into_temp_path())
    }
}

fn file_size(path: &Path) -> Result<u64, PrepareError> {
    Ok(fs::metadata(path).map_err(PrepareError::io(path))?.len())
}

fn close_quietly(path: TempPath) {
    let shown = path.display().to_string();
    if let Err(e) = path.close() {
        tracing::warn!(file = %shown, error = %e, "Failed to remove temporary file");
    }
}
