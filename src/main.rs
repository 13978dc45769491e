// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! annoview - labeled dataset viewer
//!
//! A desktop application for stepping through image datasets with their
//! detection or segmentation labels burned in, and for triaging bad samples.

mod app;
mod config;
mod error;
mod io;
mod models;
mod navigator;
mod playback;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::ViewerApp;
use clap::Parser;
use config::{Cli, Settings};

fn main() -> Result<()> {
    // Initialize logging, `RUST_LOG` overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_cli(Cli::parse())?;
    log::info!(
        "viewing {} ({:?}, labels in {})",
        settings.images_root.display(),
        settings.kind,
        settings.annotations_root.display()
    );

    let (width, height) = settings.window_size;
    let app = ViewerApp::new(settings)?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32, height as f32])
            .with_min_inner_size([800.0, 600.0])
            .with_title("annoview"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native("annoview", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
