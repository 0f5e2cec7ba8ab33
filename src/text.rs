//! Glyph layout and rasterization onto RGB images.

use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};

/// Measured extent of a laid-out text run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextExtent {
    /// Width in pixels of the tight glyph bounding box.
    pub(crate) width: u32,
    /// Height in pixels of the tight glyph bounding box.
    pub(crate) height: u32,
}

/// Measures a text run at the given pixel size.
pub(crate) fn measure(font: &Font<'_>, text: &str, size: f32) -> TextExtent {
    let scale = Scale::uniform(size);
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<_> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();

    if glyphs.is_empty() {
        return TextExtent {
            width: 0,
            height: size.ceil() as u32,
        };
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;

    for glyph in &glyphs {
        if let Some(bb) = glyph.unpositioned().exact_bounding_box() {
            let pos = glyph.position();
            min_x = min_x.min(pos.x + bb.min.x);
            min_y = min_y.min(pos.y + bb.min.y);
            max_x = max_x.max(pos.x + bb.max.x);
            max_y = max_y.max(pos.y + bb.max.y);
        }
    }

    // All-whitespace runs have no bounding boxes.
    if min_x > max_x {
        return TextExtent {
            width: glyphs
                .last()
                .map(|g| (g.position().x + g.unpositioned().h_metrics().advance_width) as u32)
                .unwrap_or(0),
            height: size.ceil() as u32,
        };
    }

    TextExtent {
        width: (max_x - min_x).ceil() as u32,
        height: (max_y - min_y).ceil() as u32,
    }
}

/// Draws a text run with its top-left corner at `(x, y)`, alpha-blending
/// glyph coverage over the existing pixels.
pub(crate) fn draw(
    img: &mut RgbImage,
    font: &Font<'_>,
    text: &str,
    size: f32,
    x: i32,
    y: i32,
    color: Rgb<u8>,
) {
    let scale = Scale::uniform(size);
    let v_metrics = font.v_metrics(scale);
    let start = point(x as f32, y as f32 + v_metrics.ascent);

    for glyph in font.layout(text, scale, start) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bb.min.x + gx as i32;
            let py = bb.min.y + gy as i32;
            if px < 0 || py < 0 || px >= img.width() as i32 || py >= img.height() as i32 {
                return;
            }
            let pixel = img.get_pixel_mut(px as u32, py as u32);
            for c in 0..3 {
                let base = f32::from(pixel.0[c]);
                let ink = f32::from(color.0[c]);
                pixel.0[c] = (base + (ink - base) * coverage).round() as u8;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font;

    #[test]
    fn test_measure_nonempty() {
        let Ok(f) = font::resolve("Sans") else { return };
        let extent = measure(f, "Hello", 32.0);
        assert!(extent.width > 0);
        assert!(extent.height > 0);
    }

    #[test]
    fn test_measure_empty_string() {
        let Ok(f) = font::resolve("Sans") else { return };
        let extent = measure(f, "", 32.0);
        assert_eq!(extent.width, 0);
    }

    #[test]
    fn test_draw_changes_pixels() {
        let Ok(f) = font::resolve("Sans") else { return };
        let mut img = RgbImage::from_pixel(200, 60, Rgb([255, 255, 255]));
        draw(&mut img, f, "Hi", 40.0, 10, 5, Rgb([0, 0, 0]));

        let touched = img.pixels().any(|p| p.0 != [255, 255, 255]);
        assert!(touched);
    }

    #[test]
    fn test_draw_clips_outside_canvas() {
        let Ok(f) = font::resolve("Sans") else { return };
        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        // Must not panic even though most glyphs land outside.
        draw(&mut img, f, "Clipping test", 40.0, -20, -20, Rgb([0, 0, 0]));
    }
}
