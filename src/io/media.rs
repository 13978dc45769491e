// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading.
//!
//! This module handles decoding image files into RGB rasters suitable for
//! overlay drawing and display in egui.

use crate::error::{Result, ViewerError};
use image::RgbImage;
use std::path::Path;

/// Image extensions picked up when scanning a dataset.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "png", "jpeg", "tiff"];

/// Decode an image file to 8-bit RGB.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|source| ViewerError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// True when `path` has one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
