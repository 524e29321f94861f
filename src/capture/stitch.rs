//! Vertical stitching of sequentially captured viewport images.

use anyhow::{Context, Result};
use image::{imageops, RgbaImage};
use std::path::PathBuf;

/// Vertically concatenate the images at `paths`, in list order.
///
/// Canvas width is the widest part, height the sum of part heights; each
/// part lands at x = 0, so narrower parts leave their right margin
/// transparent. The caller decides where the result is written.
pub fn stitch_vertical(paths: &[PathBuf]) -> Result<RgbaImage> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let img =
            image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
        parts.push(img.to_rgba8());
    }

    let width = parts.iter().map(|p| p.width()).max().unwrap_or(0);
    let height: u32 = parts.iter().map(|p| p.height()).sum();
    anyhow::ensure!(width > 0 && height > 0, "nothing to stitch");

    let mut canvas = RgbaImage::new(width, height);
    let mut y: i64 = 0;
    for part in &parts {
        imageops::replace(&mut canvas, part, 0, y);
        y += i64::from(part.height());
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_png(dir: &std::path::Path, name: &str, w: u32, h: u32, px: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba(px)).save(&path).unwrap();
        path
    }

    #[test]
    fn stitches_in_order_with_max_width() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            solid_png(dir.path(), "p1.png", 800, 100, [255, 0, 0, 255]),
            solid_png(dir.path(), "p2.png", 600, 200, [0, 255, 0, 255]),
            solid_png(dir.path(), "p3.png", 800, 150, [0, 0, 255, 255]),
        ];

        let canvas = stitch_vertical(&paths).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (800, 450));

        // Parts in list order at increasing offsets.
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 100), &Rgba([0, 255, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 300), &Rgba([0, 0, 255, 255]));

        // Narrow part leaves its right margin untouched (transparent).
        assert_eq!(canvas.get_pixel(700, 150), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn single_image_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![solid_png(dir.path(), "only.png", 320, 240, [9, 9, 9, 255])];
        let canvas = stitch_vertical(&paths).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (320, 240));
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(stitch_vertical(&[]).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = vec![dir.path().join("nope.png")];
        assert!(stitch_vertical(&missing).is_err());
    }
}
