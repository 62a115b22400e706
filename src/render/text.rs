//! Text rasterization onto ticket images.
//!
//! Outline faces are rendered with ab_glyph using anti-aliased coverage.
//! The bundled bitmap face is scaled nearest-neighbor from its 12×24 cells.
//! In both cases the text position is the top-left corner of the first line,
//! and `\n` starts a new line.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::RgbImage;
use spleen_font::{FONT_12X24, PSF2Font};

use super::font::{Face, FontHandle};
use crate::spec::Color;

/// Extra pixels between lines of multi-line text.
const LINE_SPACING: f32 = 4.0;

const BITMAP_CELL_WIDTH: usize = 12;
const BITMAP_CELL_HEIGHT: usize = 24;

/// Draw `text` onto `image` with its top-left corner at `position`.
pub fn draw_text(
    image: &mut RgbImage,
    font: &FontHandle,
    position: (f32, f32),
    text: &str,
    color: Color,
) {
    match &font.face {
        Face::Outline(face) => draw_outline_text(image, face, font.size, position, text, color),
        Face::Bitmap => draw_bitmap_text(image, font.size, position, text, color),
    }
}

/// Pixel scale at which a face's em square is `size` pixels tall.
fn em_scale(font: &FontArc, size: u32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size as f32 * font.height_unscaled() / units_per_em)
}

fn draw_outline_text(
    image: &mut RgbImage,
    font: &FontArc,
    size: u32,
    (x, y): (f32, f32),
    text: &str,
    color: Color,
) {
    let scale = em_scale(font, size);
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + LINE_SPACING;

    for (line_no, line) in text.split('\n').enumerate() {
        let baseline = y + scaled.ascent() + line_no as f32 * line_height;
        let mut caret = x;
        let mut previous = None;

        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i64 + gx as i64;
                    let py = bounds.min.y as i64 + gy as i64;
                    blend_pixel(image, px, py, color, coverage);
                });
            }
        }
    }
}

fn draw_bitmap_text(
    image: &mut RgbImage,
    size: u32,
    (x, y): (f32, f32),
    text: &str,
    color: Color,
) {
    let mut spleen = match PSF2Font::new(FONT_12X24) {
        Ok(font) => font,
        Err(_) => {
            log::warn!("Bundled bitmap font failed to load; text skipped");
            return;
        }
    };

    let factor = size.max(1) as f32 / BITMAP_CELL_HEIGHT as f32;
    let cell_width = ((BITMAP_CELL_WIDTH as f32 * factor).round() as usize).max(1);
    let cell_height = ((BITMAP_CELL_HEIGHT as f32 * factor).round() as usize).max(1);
    let line_height = cell_height as f32 + LINE_SPACING;

    for (line_no, line) in text.split('\n').enumerate() {
        let top = (y + line_no as f32 * line_height) as i64;
        for (col, ch) in line.chars().enumerate() {
            let left = (x + (col * cell_width) as f32) as i64;
            let bitmap = glyph_bitmap(&mut spleen, ch);

            for ty in 0..cell_height {
                for tx in 0..cell_width {
                    let sx = tx * BITMAP_CELL_WIDTH / cell_width;
                    let sy = ty * BITMAP_CELL_HEIGHT / cell_height;
                    if bitmap[sy * BITMAP_CELL_WIDTH + sx] {
                        blend_pixel(image, left + tx as i64, top + ty as i64, color, 1.0);
                    }
                }
            }
        }
    }
}

/// 12×24 on/off cells for `ch`; unknown characters render as a box.
fn glyph_bitmap(spleen: &mut PSF2Font, ch: char) -> Vec<bool> {
    let mut bitmap = vec![false; BITMAP_CELL_WIDTH * BITMAP_CELL_HEIGHT];
    if ch == ' ' {
        return bitmap;
    }

    let utf8 = ch.to_string();
    match spleen.glyph_for_utf8(utf8.as_bytes()) {
        Some(glyph) => {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < BITMAP_CELL_HEIGHT && col_x < BITMAP_CELL_WIDTH {
                        bitmap[row_y * BITMAP_CELL_WIDTH + col_x] = on;
                    }
                }
            }
        }
        None => {
            for x in 0..BITMAP_CELL_WIDTH {
                bitmap[x] = true;
                bitmap[(BITMAP_CELL_HEIGHT - 1) * BITMAP_CELL_WIDTH + x] = true;
            }
            for y in 0..BITMAP_CELL_HEIGHT {
                bitmap[y * BITMAP_CELL_WIDTH] = true;
                bitmap[y * BITMAP_CELL_WIDTH + BITMAP_CELL_WIDTH - 1] = true;
            }
        }
    }
    bitmap
}

/// Blend `color` over one pixel with the given coverage; out-of-bounds is a no-op.
fn blend_pixel(image: &mut RgbImage, x: i64, y: i64, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0) * color.alpha() as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let base = pixel.0[c] as f32;
        pixel.0[c] = (base + (color.0[c] as f32 - base) * alpha).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    fn ink(image: &RgbImage) -> usize {
        image.pixels().filter(|p| p.0 != [255, 255, 255]).count()
    }

    fn bitmap(size: u32) -> FontHandle {
        FontHandle {
            face: Face::Bitmap,
            size,
        }
    }

    #[test]
    fn test_bitmap_text_draws_pixels() {
        let mut image = blank(100, 40);
        draw_text(&mut image, &bitmap(24), (2.0, 2.0), "Hi", Color::BLACK);
        assert!(ink(&image) > 0);
    }

    #[test]
    fn test_bitmap_text_stays_inside_its_box() {
        let mut image = blank(200, 100);
        draw_text(&mut image, &bitmap(24), (50.0, 30.0), "AB", Color::BLACK);
        for (x, y, p) in image.enumerate_pixels() {
            if p.0 != [255, 255, 255] {
                assert!((50..74).contains(&x), "x = {}", x);
                assert!((30..54).contains(&y), "y = {}", y);
            }
        }
    }

    #[test]
    fn test_bitmap_scales_with_size() {
        let mut small = blank(200, 100);
        let mut large = blank(200, 100);
        draw_text(&mut small, &bitmap(12), (0.0, 0.0), "8", Color::BLACK);
        draw_text(&mut large, &bitmap(48), (0.0, 0.0), "8", Color::BLACK);
        assert!(ink(&large) > ink(&small) * 2);
    }

    #[test]
    fn test_text_clipped_at_edges() {
        let mut image = blank(10, 10);
        draw_text(&mut image, &bitmap(24), (-5.0, -5.0), "WWW", Color::BLACK);
        draw_text(&mut image, &bitmap(24), (8.0, 8.0), "WWW", Color::BLACK);
        assert_eq!(image.dimensions(), (10, 10));
    }

    #[test]
    fn test_multiline_text_moves_down() {
        let mut image = blank(60, 80);
        draw_text(&mut image, &bitmap(24), (0.0, 0.0), "\nX", Color::BLACK);
        let first_ink_row = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [255, 255, 255])
            .map(|(_, y, _)| y)
            .min()
            .unwrap();
        assert!(first_ink_row >= 28);
    }

    #[test]
    fn test_transparent_color_draws_nothing() {
        let mut image = blank(50, 30);
        draw_text(&mut image, &bitmap(24), (0.0, 0.0), "X", Color([0, 0, 0, 0]));
        assert_eq!(ink(&image), 0);
    }

    #[test]
    fn test_blend_pixel_half_alpha() {
        let mut image = blank(1, 1);
        blend_pixel(&mut image, 0, 0, Color([0, 0, 0, 255]), 0.5);
        assert_eq!(image.get_pixel(0, 0).0, [128, 128, 128]);
    }
}
