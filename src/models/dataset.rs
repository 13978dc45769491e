// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset index.
//!
//! The ordered list of image records a session walks through, along with the
//! roots they were enumerated from. Records are built once at startup and
//! never re-packed: a triaged record stays in the list but becomes
//! unreachable because its annotation file is gone.

use crate::error::{Result, ViewerError};
use std::path::{Path, PathBuf};

/// Extension of annotation files paired with images.
pub const ANNOTATION_EXTENSION: &str = "txt";

/// An image and the annotation file it pairs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub image_path: PathBuf,
    pub annotation_path: PathBuf,
}

impl ImageRecord {
    pub fn has_annotation(&self) -> bool {
        self.annotation_path.is_file()
    }
}

/// Ordered, session-scoped sequence of image records.
#[derive(Debug, Clone)]
pub struct Dataset {
    images_root: PathBuf,
    annotations_root: PathBuf,
    records: Vec<ImageRecord>,
}

impl Dataset {
    /// Build the index from already enumerated image paths.
    ///
    /// Paths must live under `images_root`; the annotation of
    /// `images_root/rel/name.ext` is `annotations_root/rel/name.txt`.
    pub fn from_image_paths(
        images_root: impl Into<PathBuf>,
        annotations_root: impl Into<PathBuf>,
        image_paths: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self> {
        let images_root = images_root.into();
        let annotations_root = annotations_root.into();

        let records = image_paths
            .into_iter()
            .map(|image_path| {
                let annotation_path =
                    annotation_path_for(&image_path, &images_root, &annotations_root)?;
                Ok(ImageRecord {
                    image_path,
                    annotation_path,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            images_root,
            annotations_root,
            records,
        })
    }

    pub fn images_root(&self) -> &Path {
        &self.images_root
    }

    pub fn annotations_root(&self) -> &Path {
        &self.annotations_root
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    /// Image path relative to the images root, used as the on-image caption.
    pub fn caption_for(&self, record: &ImageRecord) -> String {
        record
            .image_path
            .strip_prefix(&self.images_root)
            .unwrap_or(&record.image_path)
            .display()
            .to_string()
    }
}

/// Derive the annotation path for an image.
pub fn annotation_path_for(
    image_path: &Path,
    images_root: &Path,
    annotations_root: &Path,
) -> Result<PathBuf> {
    let relative = relative_to(image_path, images_root)?;
    Ok(annotations_root
        .join(relative)
        .with_extension(ANNOTATION_EXTENSION))
}

/// `path` relative to `root`, or [`ViewerError::OutsideRoot`].
pub fn relative_to<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root).map_err(|_| ViewerError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })
}
