// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zoom and pan state over a rendered frame.
//!
//! The viewport is a window of `original_size / scale` pixels centered on
//! `center`, both in the pixel space of the full-resolution frame. Parts of
//! the window that fall outside the frame are zero-filled instead of being
//! clamped, which keeps cursor-anchored zoom continuous near the edges.

use crate::render::THICKNESS_SCALE_THRESHOLD;
use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Scale change per wheel notch.
pub const ZOOM_STEP: f64 = 0.2;

/// Weight of the old center when moving toward the pointer.
pub const CENTER_SMOOTHING: f64 = 0.8;

const SCALE_EPSILON: f64 = 1e-6;

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 8.0,
        }
    }
}

/// Crop window in frame pixel space. May extend past the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Result of a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    /// Scale already at its limit, nothing changed.
    Unchanged,
    /// Scale changed. `redraw_overlay` is set when the overlay stroke
    /// bracket changed and the frame must be rendered again.
    Zoomed { redraw_overlay: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    center: (f64, f64),
    original_size: (u32, u32),
    limits: ZoomLimits,
}

impl Viewport {
    /// Identity viewport over a frame of `original_size`.
    pub fn new(original_size: (u32, u32), limits: ZoomLimits) -> Self {
        Self {
            scale: 1.0,
            center: (original_size.0 as f64 / 2.0, original_size.1 as f64 / 2.0),
            original_size,
            limits,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn is_identity(&self) -> bool {
        *self == Viewport::new(self.original_size, self.limits)
    }

    /// Size of the visible window in frame pixels.
    pub fn current_size(&self) -> (f64, f64) {
        (
            self.original_size.0 as f64 / self.scale,
            self.original_size.1 as f64 / self.scale,
        )
    }

    /// Map a display-space position to frame pixel space.
    pub fn display_to_image(&self, pointer: (f64, f64), display_size: (f64, f64)) -> (f64, f64) {
        let (w, h) = self.current_size();
        (
            pointer.0 / display_size.0 * w + self.center.0 - w / 2.0,
            pointer.1 / display_size.1 * h + self.center.1 - h / 2.0,
        )
    }

    /// Map a frame pixel position to display space.
    #[cfg(test)]
    pub fn image_to_display(&self, point: (f64, f64), display_size: (f64, f64)) -> (f64, f64) {
        let (w, h) = self.current_size();
        (
            (point.0 - self.center.0 + w / 2.0) / w * display_size.0,
            (point.1 - self.center.1 + h / 2.0) / h * display_size.1,
        )
    }

    /// Apply `steps` wheel notches at `pointer` (display coordinates).
    pub fn zoom_at(&mut self, pointer: (f64, f64), display_size: (f64, f64), steps: i32) -> ZoomOutcome {
        let new_scale = (self.scale + ZOOM_STEP * steps as f64)
            .clamp(self.limits.min_scale, self.limits.max_scale);
        if (new_scale - self.scale).abs() < SCALE_EPSILON {
            return ZoomOutcome::Unchanged;
        }

        let anchor = self.display_to_image(pointer, display_size);
        self.center = (
            CENTER_SMOOTHING * self.center.0 + (1.0 - CENTER_SMOOTHING) * anchor.0,
            CENTER_SMOOTHING * self.center.1 + (1.0 - CENTER_SMOOTHING) * anchor.1,
        );

        let redraw_overlay = (self.scale < THICKNESS_SCALE_THRESHOLD) != (new_scale < THICKNESS_SCALE_THRESHOLD);
        log::debug!(
            "zoom {:.1} -> {:.1}, center ({:.1}, {:.1})",
            self.scale,
            new_scale,
            self.center.0,
            self.center.1
        );
        self.scale = new_scale;

        ZoomOutcome::Zoomed { redraw_overlay }
    }

    pub fn crop_window(&self) -> CropWindow {
        let (width, height) = self.current_size();
        CropWindow {
            x: self.center.0 - width / 2.0,
            y: self.center.1 - height / 2.0,
            width,
            height,
        }
    }

    /// Crop `frame` to the viewport, zero-padding outside it, and resize the
    /// crop back to the frame's size.
    ///
    /// `frame` must be the canonical full-resolution render so resampling
    /// error never compounds across zoom steps.
    pub fn apply(&self, frame: &RgbImage) -> RgbImage {
        if self.is_identity() && frame.dimensions() == self.original_size {
            return frame.clone();
        }

        let window = self.crop_window();
        let x0 = window.x.round() as i64;
        let y0 = window.y.round() as i64;
        let crop_w = (window.width.round() as u32).max(1);
        let crop_h = (window.height.round() as u32).max(1);

        let mut crop = RgbImage::new(crop_w, crop_h);
        imageops::replace(&mut crop, frame, -x0, -y0);

        let (out_w, out_h) = self.original_size;
        if (crop_w, crop_h) == (out_w, out_h) {
            return crop;
        }
        imageops::resize(&crop, out_w.max(1), out_h.max(1), FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const DISPLAY: (f64, f64) = (1000.0, 1000.0);

    fn viewport() -> Viewport {
        Viewport::new((1000, 1000), ZoomLimits::default())
    }

    #[test]
    fn test_identity_state() {
        let vp = viewport();
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.center(), (500.0, 500.0));
        assert!(vp.is_identity());
        assert_eq!(vp.crop_window(), CropWindow { x: 0.0, y: 0.0, width: 1000.0, height: 1000.0 });
    }

    #[test]
    fn test_scale_stays_within_limits() {
        let mut vp = viewport();
        let limits = ZoomLimits::default();
        let sequence = [3, 40, -1, -100, 7, 7, 7, -2, 55, -13, 1, 1, -60];
        for steps in sequence {
            vp.zoom_at((123.0, 877.0), DISPLAY, steps);
            assert!(vp.scale() >= limits.min_scale && vp.scale() <= limits.max_scale);
        }
    }

    #[test]
    fn test_zoom_at_limit_is_noop() {
        let mut vp = Viewport::new((100, 100), ZoomLimits { min_scale: 1.0, max_scale: 2.0 });
        assert_eq!(vp.zoom_at((10.0, 10.0), (100.0, 100.0), -1), ZoomOutcome::Unchanged);
        assert!(vp.is_identity());
    }

    #[test]
    fn test_zoom_crossing_threshold_requests_redraw() {
        let mut vp = viewport();
        assert_eq!(vp.zoom_at((500.0, 500.0), DISPLAY, 1), ZoomOutcome::Zoomed { redraw_overlay: false });
        assert_eq!(vp.zoom_at((500.0, 500.0), DISPLAY, 2), ZoomOutcome::Zoomed { redraw_overlay: true });
        assert_eq!(vp.zoom_at((500.0, 500.0), DISPLAY, 1), ZoomOutcome::Zoomed { redraw_overlay: false });
        assert_eq!(vp.zoom_at((500.0, 500.0), DISPLAY, -3), ZoomOutcome::Zoomed { redraw_overlay: true });
    }

    #[test]
    fn test_center_smoothing_toward_pointer() {
        let mut vp = viewport();
        vp.zoom_at((700.0, 300.0), DISPLAY, 1);
        let (cx, cy) = vp.center();
        assert!((cx - 540.0).abs() < 1e-9);
        assert!((cy - 460.0).abs() < 1e-9);
        assert!((vp.scale() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_zoom_keeps_pointer_anchored() {
        let pointer = (700.0, 700.0);
        let mut vp = viewport();
        let anchor = vp.display_to_image(pointer, DISPLAY);

        let mut previous_width = vp.current_size().0;
        for _ in 0..2 {
            vp.zoom_at(pointer, DISPLAY, 1);
            let width = vp.current_size().0;
            assert!(width < previous_width);
            previous_width = width;
        }

        // Where the original anchor now appears on screen, versus where a
        // zoom about the frame center would have put it.
        let anchored = vp.image_to_display(anchor, DISPLAY);
        let mut centered = viewport();
        centered.zoom_at((500.0, 500.0), DISPLAY, 2);
        let unanchored = centered.image_to_display(anchor, DISPLAY);

        let drift = (anchored.0 - pointer.0).hypot(anchored.1 - pointer.1);
        let naive_drift = (unanchored.0 - pointer.0).hypot(unanchored.1 - pointer.1);
        assert!(drift < naive_drift);
        assert!(drift < 0.05 * DISPLAY.0);
    }

    #[test]
    fn test_crop_fully_outside_is_zero_padded() {
        let frame = RgbImage::from_pixel(200, 100, Rgb([200, 150, 100]));
        let mut vp = Viewport::new((200, 100), ZoomLimits::default());
        vp.center = (-5000.0, -5000.0);
        vp.scale = 2.0;

        let out = vp.apply(&frame);
        assert_eq!(out.dimensions(), (200, 100));
        assert!(out.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_crop_partially_outside_pads_left_edge() {
        let frame = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        let mut vp = Viewport::new((100, 100), ZoomLimits::default());
        vp.center = (0.0, 50.0);
        vp.scale = 2.0;

        // Window is x in [-25, 25): left half padding, right half frame.
        let out = vp.apply(&frame);
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(*out.get_pixel(5, 50), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(95, 50), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_identity_apply_is_copy() {
        let mut frame = RgbImage::new(4, 3);
        frame.put_pixel(1, 2, Rgb([9, 8, 7]));
        let vp = Viewport::new((4, 3), ZoomLimits::default());
        assert_eq!(vp.apply(&frame), frame);
    }

    #[test]
    fn test_zoom_out_pads_around_frame() {
        let frame = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        let mut vp = Viewport::new((100, 100), ZoomLimits::default());
        vp.zoom_at((50.0, 50.0), (100.0, 100.0), -2);
        assert!((vp.scale() - 0.6).abs() < 1e-9);

        let out = vp.apply(&frame);
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(50, 50), Rgb([255, 255, 255]));
    }
}
