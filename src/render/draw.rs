// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raster drawing primitives used to burn overlays into frames.
//!
//! Everything here clips silently against the image bounds, since annotation
//! coordinates slightly outside `[0, 1]` are common in real datasets.

use crate::util::geometry::PixelRect;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

/// Side length of a glyph cell at scale 1.
pub const GLYPH_SIZE: i64 = 8;

fn put_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < image.width() as i64 && y < image.height() as i64 {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect_clipped(image: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
    let x_start = x1.max(0);
    let y_start = y1.max(0);
    let x_end = x2.min(image.width() as i64 - 1);
    let y_end = y2.min(image.height() as i64 - 1);
    for y in y_start..=y_end {
        for x in x_start..=x_end {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Unfilled rectangle; extra thickness grows inward from the corners.
pub fn draw_hollow_rect(image: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>, thickness: u32) {
    let (x1, x2) = (rect.x1.min(rect.x2), rect.x1.max(rect.x2));
    let (y1, y2) = (rect.y1.min(rect.y2), rect.y1.max(rect.y2));

    for k in 0..thickness as i64 {
        let (l, r, t, b) = (x1 + k, x2 - k, y1 + k, y2 - k);
        if l > r || t > b {
            break;
        }
        fill_rect_clipped(image, l, t, r, t, color);
        fill_rect_clipped(image, l, b, r, b, color);
        fill_rect_clipped(image, l, t, l, b, color);
        fill_rect_clipped(image, r, t, r, b, color);
    }
}

/// Fill a polygon given in pixel coordinates using the even-odd rule.
///
/// The polygon is closed implicitly. A pixel is filled when its center lies
/// inside the polygon.
pub fn fill_polygon(image: &mut RgbImage, points: &[(f64, f64)], color: Rgb<u8>) {
    if points.len() < 3 {
        return;
    }

    let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let row_start = ((min_y - 0.5).ceil() as i64).max(0);
    let row_end = ((max_y - 0.5).floor() as i64).min(image.height() as i64 - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for row in row_start..=row_end {
        let y = row as f64 + 0.5;
        crossings.clear();

        for i in 0..points.len() {
            let (ax, ay) = points[i];
            let (bx, by) = points[(i + 1) % points.len()];
            // Half-open rule so shared vertices are counted once.
            if (ay <= y && by > y) || (by <= y && ay > y) {
                crossings.push(ax + (y - ay) / (by - ay) * (bx - ax));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let x_start = (span[0] - 0.5).ceil() as i64;
            let x_end = (span[1] - 0.5).floor() as i64;
            if x_start <= x_end {
                fill_rect_clipped(image, x_start, row, x_end, row, color);
            }
        }
    }
}

/// Draw `text` with its top-left corner at `(x, y)`, each glyph pixel
/// magnified to a `scale` x `scale` block.
pub fn draw_text(image: &mut RgbImage, text: &str, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1) as i64;
    let mut pen_x = x;

    for c in text.chars() {
        let glyph = BASIC_FONTS.get(c).or_else(|| BASIC_FONTS.get('?'));
        if let Some(rows) = glyph {
            for (gy, bits) in rows.iter().enumerate() {
                for gx in 0..8 {
                    if bits & (1 << gx) == 0 {
                        continue;
                    }
                    let px = pen_x + gx as i64 * scale;
                    let py = y + gy as i64 * scale;
                    if scale == 1 {
                        put_pixel_clipped(image, px, py, color);
                    } else {
                        fill_rect_clipped(image, px, py, px + scale - 1, py + scale - 1, color);
                    }
                }
            }
        }
        pen_x += GLYPH_SIZE * scale;
    }
}

/// Per-channel `image_weight * image + mask_weight * mask`, in place.
pub fn blend_into(image: &mut RgbImage, mask: &RgbImage, image_weight: f32, mask_weight: f32) {
    for (dst, src) in image.pixels_mut().zip(mask.pixels()) {
        for c in 0..3 {
            let value = dst.0[c] as f32 * image_weight + src.0[c] as f32 * mask_weight;
            dst.0[c] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_hollow_rect_outline_only() {
        let mut image = RgbImage::new(20, 20);
        draw_hollow_rect(&mut image, &PixelRect { x1: 5, y1: 5, x2: 15, y2: 15 }, RED, 1);

        assert_eq!(*image.get_pixel(5, 5), RED);
        assert_eq!(*image.get_pixel(15, 15), RED);
        assert_eq!(*image.get_pixel(10, 5), RED);
        assert_eq!(*image.get_pixel(5, 10), RED);
        assert_eq!(*image.get_pixel(10, 10), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(6, 6), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_hollow_rect_thickness_grows_inward() {
        let mut image = RgbImage::new(20, 20);
        draw_hollow_rect(&mut image, &PixelRect { x1: 5, y1: 5, x2: 15, y2: 15 }, RED, 2);
        assert_eq!(*image.get_pixel(6, 10), RED);
        assert_eq!(*image.get_pixel(7, 10), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(4, 10), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_hollow_rect_clips_outside_image() {
        let mut image = RgbImage::new(10, 10);
        draw_hollow_rect(&mut image, &PixelRect { x1: -5, y1: -5, x2: 30, y2: 4 }, RED, 1);
        assert_eq!(*image.get_pixel(3, 4), RED);
        assert_eq!(*image.get_pixel(3, 3), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut image = RgbImage::from_pixel(10, 10, WHITE);
        fill_polygon(&mut image, &[(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)], RED);

        assert_eq!(*image.get_pixel(2, 2), RED);
        assert_eq!(*image.get_pixel(7, 7), RED);
        assert_eq!(*image.get_pixel(5, 5), RED);
        assert_eq!(*image.get_pixel(8, 8), WHITE);
        assert_eq!(*image.get_pixel(1, 5), WHITE);
    }

    #[test]
    fn test_fill_polygon_triangle_is_filled_not_outlined() {
        let mut image = RgbImage::from_pixel(100, 100, WHITE);
        fill_polygon(&mut image, &[(10.0, 90.0), (50.0, 10.0), (90.0, 90.0)], RED);

        assert_eq!(*image.get_pixel(50, 60), RED);
        assert_eq!(*image.get_pixel(15, 20), WHITE);
        assert_eq!(*image.get_pixel(85, 20), WHITE);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut image = RgbImage::new(40, 20);
        draw_text(&mut image, "17", 2, 2, 1, RED);
        let painted = image.pixels().filter(|p| **p == RED).count();
        assert!(painted > 0);
        // Nothing outside the two glyph cells.
        for y in 0..20 {
            for x in 18..40 {
                assert_eq!(*image.get_pixel(x, y), Rgb([0, 0, 0]));
            }
        }
    }

    #[test]
    fn test_draw_text_clips_above_image() {
        let mut image = RgbImage::new(16, 16);
        draw_text(&mut image, "8", 0, -20, 2, RED);
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_blend_weights() {
        let mut image = RgbImage::from_pixel(2, 2, Rgb([100, 0, 200]));
        let mask = RgbImage::from_pixel(2, 2, WHITE);
        blend_into(&mut image, &mask, 0.7, 0.3);
        // 0.7 * 100 + 0.3 * 255 = 146.5 -> 147 (round half away from zero)
        assert_eq!(*image.get_pixel(0, 0), Rgb([147, 77, 217]));
    }
}
