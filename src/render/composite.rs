// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Compositing of segmentation masks with their source image.

use super::draw::blend_into;
use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Weight of the source image in merge mode; the mask gets the remainder.
pub const MERGE_IMAGE_WEIGHT: f32 = 0.7;

/// How a segmentation mask is combined with its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    /// Alpha-blend the mask over the image.
    #[default]
    Merge,
    /// Show image and mask next to each other.
    Split,
}

impl CompositeMode {
    pub fn toggled(self) -> Self {
        match self {
            CompositeMode::Merge => CompositeMode::Split,
            CompositeMode::Split => CompositeMode::Merge,
        }
    }
}

/// Stacking direction chosen for split mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitLayout {
    /// Image on top, mask below.
    Vertical,
    /// Image on the left, mask on the right.
    Horizontal,
}

/// Combine `image` and `mask` according to `mode`.
pub fn composite(mode: CompositeMode, mut image: RgbImage, mask: &RgbImage, display_size: (u32, u32)) -> RgbImage {
    match mode {
        CompositeMode::Merge => {
            blend_into(&mut image, mask, MERGE_IMAGE_WEIGHT, 1.0 - MERGE_IMAGE_WEIGHT);
            image
        }
        CompositeMode::Split => split(&image, mask, display_size),
    }
}

/// Pick the stacking whose aspect ratio is closest to the display's.
pub fn choose_layout(image_size: (u32, u32), display_size: (u32, u32)) -> SplitLayout {
    let (w, h) = (image_size.0 as f64, image_size.1 as f64);
    let display_aspect = display_size.0 as f64 / display_size.1 as f64;

    let vertical_deviation = (w / (2.0 * h) - display_aspect).abs();
    let horizontal_deviation = ((2.0 * w) / h - display_aspect).abs();

    if vertical_deviation < horizontal_deviation {
        SplitLayout::Vertical
    } else {
        SplitLayout::Horizontal
    }
}

/// Place image and mask side by side, shrinking uniformly when the stacked
/// axis overflows the display.
pub fn split(image: &RgbImage, mask: &RgbImage, display_size: (u32, u32)) -> RgbImage {
    let (w, h) = image.dimensions();
    let layout = choose_layout((w, h), display_size);

    let mut stacked = match layout {
        SplitLayout::Vertical => RgbImage::new(w, h * 2),
        SplitLayout::Horizontal => RgbImage::new(w * 2, h),
    };
    imageops::replace(&mut stacked, image, 0, 0);
    match layout {
        SplitLayout::Vertical => imageops::replace(&mut stacked, mask, 0, h as i64),
        SplitLayout::Horizontal => imageops::replace(&mut stacked, mask, w as i64, 0),
    }

    let (stacked_len, bound) = match layout {
        SplitLayout::Vertical => (stacked.height(), display_size.1),
        SplitLayout::Horizontal => (stacked.width(), display_size.0),
    };
    if stacked_len <= bound {
        return stacked;
    }

    let factor = bound as f64 / stacked_len as f64;
    let new_w = ((stacked.width() as f64 * factor).round() as u32).max(1);
    let new_h = ((stacked.height() as f64 * factor).round() as u32).max(1);
    log::debug!(
        "Downscaling split view from {}x{} to {}x{}",
        stacked.width(),
        stacked.height(),
        new_w,
        new_h
    );
    imageops::resize(&stacked, new_w, new_h, FilterType::Triangle)
}
