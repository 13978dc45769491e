// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line and settings file handling.
//!
//! Settings come from an optional YAML/JSON file and are overridden by
//! command line flags.

use crate::io::serialization::import_by_extension;
use crate::models::annotation::AnnotationKind;
use crate::models::color_map::ClassColorMap;
use crate::models::viewport::ZoomLimits;
use crate::render::composite::CompositeMode;
use anyhow::{ensure, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Review labeled image datasets and triage bad samples.
#[derive(Debug, Parser)]
#[command(name = "annoview", version, about)]
pub struct Cli {
    /// Root directory of the images
    pub images: PathBuf,

    /// Root directory of the annotation files (defaults to the images root)
    #[arg(short, long)]
    pub annotations: Option<PathBuf>,

    /// Move triaged pairs here instead of deleting them
    #[arg(short, long)]
    pub quarantine: Option<PathBuf>,

    /// Annotation encoding
    #[arg(short, long, value_enum)]
    pub kind: Option<AnnotationKind>,

    /// Initial compositing mode for segmentation masks
    #[arg(short, long, value_enum)]
    pub mode: Option<CompositeMode>,

    /// Settings file (.yaml, .yml or .json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Class color file mapping class ids to [r, g, b]
    #[arg(long)]
    pub colors: Option<PathBuf>,

    /// Seconds between images during playback
    #[arg(long)]
    pub scroll_speed: Option<f64>,

    #[arg(long)]
    pub min_scale: Option<f64>,

    #[arg(long)]
    pub max_scale: Option<f64>,
}

/// Contents of a settings file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub annotations: Option<PathBuf>,
    pub quarantine: Option<PathBuf>,
    pub kind: AnnotationKind,
    pub mode: CompositeMode,
    pub scroll_speed: f64,
    pub zoom: ZoomLimits,
    pub window_width: u32,
    pub window_height: u32,
    pub colors: ClassColorMap,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            annotations: None,
            quarantine: None,
            kind: AnnotationKind::Detection,
            mode: CompositeMode::Merge,
            scroll_speed: 0.5,
            zoom: ZoomLimits::default(),
            window_width: 1920,
            window_height: 1080,
            colors: ClassColorMap::default(),
        }
    }
}

/// Fully resolved settings for a session.
#[derive(Debug, Clone)]
pub struct Settings {
    pub images_root: PathBuf,
    pub annotations_root: PathBuf,
    pub quarantine: Option<PathBuf>,
    pub kind: AnnotationKind,
    pub mode: CompositeMode,
    pub scroll_speed: f64,
    pub zoom: ZoomLimits,
    pub window_size: (u32, u32),
    pub colors: ClassColorMap,
}

impl Settings {
    /// Resolve the command line against the optional settings file.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file: ViewerConfig = match &cli.config {
            Some(path) => import_by_extension(path)?,
            None => ViewerConfig::default(),
        };
        let colors = match &cli.colors {
            Some(path) => import_by_extension(path)?,
            None => file.colors.clone(),
        };
        Self::merge(cli, file, colors)
    }

    fn merge(cli: Cli, file: ViewerConfig, colors: ClassColorMap) -> Result<Self> {
        let annotations_root = cli
            .annotations
            .or(file.annotations)
            .unwrap_or_else(|| cli.images.clone());
        let zoom = ZoomLimits {
            min_scale: cli.min_scale.unwrap_or(file.zoom.min_scale),
            max_scale: cli.max_scale.unwrap_or(file.zoom.max_scale),
        };

        ensure!(
            zoom.min_scale > 0.0 && zoom.min_scale <= 1.0 && zoom.max_scale >= 1.0,
            "zoom limits must satisfy 0 < min_scale <= 1 <= max_scale (got {} and {})",
            zoom.min_scale,
            zoom.max_scale
        );
        let scroll_speed = cli.scroll_speed.unwrap_or(file.scroll_speed);
        ensure!(
            scroll_speed.is_finite(),
            "scroll speed must be a finite number of seconds (got {})",
            scroll_speed
        );
        ensure!(
            file.window_width > 0 && file.window_height > 0,
            "window size must be non-zero"
        );

        Ok(Self {
            images_root: cli.images,
            annotations_root,
            quarantine: cli.quarantine.or(file.quarantine),
            kind: cli.kind.unwrap_or(file.kind),
            mode: cli.mode.unwrap_or(file.mode),
            scroll_speed: scroll_speed.max(0.0),
            zoom,
            window_size: (file.window_width, file.window_height),
            colors,
        })
    }
}
