use image::imageops::FilterType;
use image::DynamicImage;

/// Single-pass resize that aims a file at a byte budget.
pub struct ImageResize;

impl ImageResize {
    /// Target dimensions for an image of `size` bytes that must fit in `budget` bytes.
    ///
    /// Both dimensions are divided by `size / budget`, which shrinks the pixel
    /// count by the square of that ratio. Never returns a zero dimension.
    pub fn dimensions_for_budget(width: u32, height: u32, size: u64, budget: u64) -> (u32, u32) {
        if size <= budget {
            return (width, height);
        }
        let fraction = size as f64 / budget.max(1) as f64;
        let scale = |dim: u32| ((dim as f64 / fraction) as u32).max(1);
        (scale(width), scale(height))
    }

    /// Bilinear resize to exact dimensions.
    pub fn scale_to(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        img.resize_exact(width, height, FilterType::Triangle)
    }
}
