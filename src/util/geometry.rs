// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides utilities for coordinate transformations between
//! normalized annotation coordinates and pixel coordinates.

use crate::models::annotation::{BoxAnnotation, Point};

/// Axis-aligned rectangle in pixel coordinates, corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Convert normalized coordinates to pixel coordinates.
pub fn denormalize_coordinates(point: &Point, width: u32, height: u32) -> (f64, f64) {
    (point.x * width as f64, point.y * height as f64)
}

/// Pixel corners of a normalized center/extent box on a `width` x `height` image.
pub fn box_to_pixel_rect(b: &BoxAnnotation, width: u32, height: u32) -> PixelRect {
    let (w, h) = (width as f64, height as f64);
    PixelRect {
        x1: ((b.cx - b.w / 2.0) * w).round() as i64,
        y1: ((b.cy - b.h / 2.0) * h).round() as i64,
        x2: ((b.cx + b.w / 2.0) * w).round() as i64,
        y2: ((b.cy + b.h / 2.0) * h).round() as i64,
    }
}

/// Inverse of [`box_to_pixel_rect`], exact up to pixel rounding.
#[cfg(test)]
pub fn pixel_rect_to_box(class_id: u32, rect: &PixelRect, width: u32, height: u32) -> BoxAnnotation {
    let (w, h) = (width as f64, height as f64);
    BoxAnnotation {
        class_id,
        cx: (rect.x1 + rect.x2) as f64 / 2.0 / w,
        cy: (rect.y1 + rect.y2) as f64 / 2.0 / h,
        w: (rect.x2 - rect.x1) as f64 / w,
        h: (rect.y2 - rect.y1) as f64 / h,
    }
}

/// Largest size with the aspect ratio of `content` that fits in `bounds`.
pub fn fit_within(content: (f32, f32), bounds: (f32, f32)) -> (f32, f32) {
    let content_aspect = content.0 / content.1;
    let bounds_aspect = bounds.0 / bounds.1;

    if content_aspect > bounds_aspect {
        // Content is wider - fit to width
        (bounds.0, bounds.0 / content_aspect)
    } else {
        // Content is taller - fit to height
        (bounds.1 * content_aspect, bounds.1)
    }
}
