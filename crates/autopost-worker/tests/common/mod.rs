#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use autopost_infra::RetryPolicy;
use autopost_worker::{Uploader, UploaderConfig};
use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

pub const CDN_URL: &str =
    "https://cdn.discordapp.com/attachments/1069000000000000000/1069000000000000002/image.png";

pub fn success_body(width: u32, height: u32) -> String {
    format!(
        r#"{{"id":"1069000000000000001","attachments":[{{"id":"1069000000000000002","filename":"image.png","size":5220,"url":"{}","proxy_url":"https://media.discordapp.net/attachments/image.png","width":{},"height":{},"content_type":"image/png"}}]}}"#,
        CDN_URL, width, height
    )
}

/// Uploader with no backoff and derived files confined to `scratch`.
pub fn uploader(scratch: &TempDir) -> Arc<Uploader> {
    let config = UploaderConfig {
        scratch_dir: Some(scratch.path().to_path_buf()),
        retry: RetryPolicy::immediate(),
        ..UploaderConfig::default()
    };
    Arc::new(Uploader::new(config).unwrap())
}

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient(width, height).save(&path).unwrap();
    path
}

pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
