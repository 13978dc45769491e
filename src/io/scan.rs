// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recursive enumeration of dataset images.

use super::media::is_supported_image;
use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All supported images under `root`, sorted by path.
///
/// Anything under `exclude` (typically a quarantine folder nested inside the
/// dataset) is skipped so triaged files do not reappear.
pub fn scan_images(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| exclude.map_or(true, |ex| !entry.path().starts_with(ex)));

    for entry in walker {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop while scanning"))
        })?;
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    log::info!("found {} images in {}", images.len(), root.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_recursive_sorted_filtered() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::write(root.join("b/nested/z.png"), b"").unwrap();
        fs::write(root.join("a.jpg"), b"").unwrap();
        fs::write(root.join("a.txt"), b"").unwrap();
        fs::write(root.join("c.TIFF"), b"").unwrap();

        let images = scan_images(root, None).unwrap();
        assert_eq!(
            images,
            vec![root.join("a.jpg"), root.join("b/nested/z.png"), root.join("c.TIFF")]
        );
    }

    #[test]
    fn test_scan_skips_excluded_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("recycled")).unwrap();
        fs::write(root.join("keep.png"), b"").unwrap();
        fs::write(root.join("recycled/gone.png"), b"").unwrap();

        let images = scan_images(root, Some(&root.join("recycled"))).unwrap();
        assert_eq!(images, vec![root.join("keep.png")]);
    }
}
