// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Quarantine and deletion of image/annotation pairs.
//!
//! A pair is either fully relocated (or fully removed) or left untouched:
//! when the second file fails, the first is put back before the error is
//! returned.

use crate::error::{Result, ViewerError};
use crate::models::dataset::{relative_to, Dataset, ImageRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to a triaged pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    Quarantined { image: PathBuf, annotation: PathBuf },
    Deleted,
}

/// Quarantine target of `path`, mirroring its position under `root`.
pub fn quarantine_target(path: &Path, root: &Path, quarantine: &Path) -> Result<PathBuf> {
    Ok(quarantine.join(relative_to(path, root)?))
}

/// Move `record` under `quarantine`, or delete it when no quarantine is set.
///
/// The image and annotation are each mirrored relative to their own root,
/// which may differ.
pub fn triage_record(dataset: &Dataset, record: &ImageRecord, quarantine: Option<&Path>) -> Result<TriageOutcome> {
    match quarantine {
        Some(quarantine) => {
            let image = quarantine_target(&record.image_path, dataset.images_root(), quarantine)?;
            let annotation =
                quarantine_target(&record.annotation_path, dataset.annotations_root(), quarantine)?;
            quarantine_pair(record, &image, &annotation)?;
            Ok(TriageOutcome::Quarantined { image, annotation })
        }
        None => {
            delete_pair(record)?;
            Ok(TriageOutcome::Deleted)
        }
    }
}

fn quarantine_pair(record: &ImageRecord, image_target: &Path, annotation_target: &Path) -> Result<()> {
    for target in [image_target, annotation_target] {
        if target.exists() {
            return Err(ViewerError::TargetExists(target.to_path_buf()));
        }
    }
    for target in [image_target, annotation_target] {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ViewerError::Triage {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    log::info!("putting image {} to quarantine", record.image_path.display());
    move_file(&record.image_path, image_target)?;

    if let Err(err) = move_file(&record.annotation_path, annotation_target) {
        if let Err(rollback) = move_file(image_target, &record.image_path) {
            log::error!(
                "Failed to restore {} after aborted triage: {}",
                record.image_path.display(),
                rollback
            );
        }
        return Err(err);
    }

    Ok(())
}

fn delete_pair(record: &ImageRecord) -> Result<()> {
    log::info!("deleting image {}", record.image_path.display());

    // Park the image next to itself so it can be restored if the annotation
    // cannot be removed.
    let parked = parked_path(&record.image_path);
    fs::rename(&record.image_path, &parked).map_err(|source| ViewerError::Triage {
        path: record.image_path.clone(),
        source,
    })?;

    if let Err(source) = fs::remove_file(&record.annotation_path) {
        if let Err(rollback) = fs::rename(&parked, &record.image_path) {
            log::error!(
                "Failed to restore {} after aborted delete: {}",
                record.image_path.display(),
                rollback
            );
        }
        return Err(ViewerError::Triage {
            path: record.annotation_path.clone(),
            source,
        });
    }

    fs::remove_file(&parked).map_err(|source| ViewerError::Triage {
        path: parked.clone(),
        source,
    })
}

fn parked_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".triage");
    path.with_file_name(name)
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    let triage_err = |source| ViewerError::Triage {
        path: from.to_path_buf(),
        source,
    };

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !from.is_file() {
                return Err(triage_err(rename_err));
            }
            log::debug!("rename of {} failed ({}), copying instead", from.display(), rename_err);
            fs::copy(from, to).map_err(|_| triage_err(rename_err))?;
            if let Err(source) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(triage_err(source));
            }
            Ok(())
        }
    }
}
