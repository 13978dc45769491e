// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the viewer core.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// The record has no annotation file. Navigation skips these.
    #[error("annotations not found: {}", .0.display())]
    AnnotationNotFound(PathBuf),

    #[error("malformed annotation in {}:{line}: {message}", .path.display())]
    MalformedAnnotation {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to load image {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is not under root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("quarantine target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("triage of {} failed: {source}", .path.display())]
    Triage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no record selected")]
    NoCurrentRecord,
}

impl ViewerError {
    /// True for the one failure the navigation skip loop recovers from.
    pub fn is_missing_annotation(&self) -> bool {
        matches!(self, ViewerError::AnnotationNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
