//! Legacy-variant image normalization: the PDF-ready rendition of a
//! full-page capture.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

/// Normalize a capture for paginated output: plain RGB (alpha dropped),
/// downscaled with Lanczos resampling when wider than `max_width`,
/// aspect ratio preserved. Narrow captures pass through untouched.
pub fn normalize_page_image(img: &DynamicImage, max_width: u32) -> RgbImage {
    let rgb = img.to_rgb8();
    if max_width == 0 || rgb.width() <= max_width {
        return rgb;
    }
    let scale = f64::from(max_width) / f64::from(rgb.width());
    let new_height = ((f64::from(rgb.height()) * scale).round() as u32).max(1);
    image::imageops::resize(&rgb, max_width, new_height, FilterType::Lanczos3)
}
