use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{DynamicImage, ImageBuffer, Pixel, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Caption burned into uploaded screenshots.
pub const WATERMARK_CAPTION: &str = "posted with autopost";

const GLYPH_SIZE: u32 = 8;

/// Watermark configuration
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    pub caption: String,
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
    /// Space between the caption and the edge of the band, in pixels.
    pub padding: u32,
    /// Integer glyph scale; 1 draws the 8x8 font as-is.
    pub scale: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            caption: WATERMARK_CAPTION.to_string(),
            foreground: Rgba([255, 255, 255, 255]),
            background: Rgba([0, 0, 0, 255]),
            padding: 5,
            scale: 2,
        }
    }
}

impl WatermarkConfig {
    fn glyph_size(&self) -> u32 {
        GLYPH_SIZE * self.scale.max(1)
    }

    /// Size of the opaque band behind the caption before clamping to the image.
    pub fn band_size(&self) -> (u32, u32) {
        let chars = self.caption.chars().count() as u32;
        let width = chars * self.glyph_size() + 2 * self.padding;
        let height = self.glyph_size() + 2 * self.padding;
        (width, height)
    }
}

pub struct Watermark;

impl Watermark {
    /// Draw an opaque band in the bottom-left corner with the caption on top.
    ///
    /// Output dimensions always match the input; the band and caption are
    /// clipped on images smaller than the band. Images without an alpha
    /// channel come back as RGB.
    pub fn apply(img: &DynamicImage, config: &WatermarkConfig) -> DynamicImage {
        if img.color().has_alpha() {
            let mut canvas = img.to_rgba8();
            draw_watermark(&mut canvas, config, config.foreground, config.background);
            DynamicImage::ImageRgba8(canvas)
        } else {
            let mut canvas = img.to_rgb8();
            draw_watermark(
                &mut canvas,
                config,
                config.foreground.to_rgb(),
                config.background.to_rgb(),
            );
            DynamicImage::ImageRgb8(canvas)
        }
    }
}

fn draw_watermark<P>(
    canvas: &mut ImageBuffer<P, Vec<u8>>,
    config: &WatermarkConfig,
    foreground: P,
    background: P,
) where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = canvas.dimensions();
    let (band_w, band_h) = config.band_size();
    let band_w = band_w.clamp(1, width);
    let band_h = band_h.clamp(1, height);
    let band_y = height - band_h;

    draw_filled_rect_mut(
        canvas,
        Rect::at(0, band_y as i32).of_size(band_w, band_h),
        background,
    );

    let text_y = band_y + config.padding.min(band_h);
    draw_caption(canvas, config, foreground, config.padding, text_y);
}

fn draw_caption<P>(
    canvas: &mut ImageBuffer<P, Vec<u8>>,
    config: &WatermarkConfig,
    foreground: P,
    x0: u32,
    y0: u32,
) where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = canvas.dimensions();
    let scale = config.scale.max(1);

    for (index, ch) in config.caption.chars().enumerate() {
        let cell_x = x0 + index as u32 * config.glyph_size();
        if cell_x >= width {
            break;
        }
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // Bit 0 is the leftmost pixel of the row
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = cell_x + col * scale + dx;
                        let y = y0 + row as u32 * scale + dy;
                        if x < width && y < height {
                            canvas.put_pixel(x, y, foreground);
                        }
                    }
                }
            }
        }
    }
}
