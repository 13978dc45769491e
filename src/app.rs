// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module wires the navigator, the playback scheduler and the UI
//! panels together. All state changes happen on the UI thread inside
//! `update`.

use crate::config::Settings;
use crate::io::scan::scan_images;
use crate::io::triage::TriageOutcome;
use crate::models::dataset::Dataset;
use crate::navigator::{Navigator, NavigatorSettings, StepStatus};
use crate::playback::{PlaybackScheduler, SPEED_STEP};
use crate::render::OverlayRenderer;
use crate::ui::{canvas, properties, toolbar};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long a status message stays visible.
const FLASH_DURATION: Duration = Duration::from_secs(2);

/// User intents, from the keyboard or the toolbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Step(isize),
    TogglePlayback,
    AdjustSpeed(f64),
    ToggleMode,
    ResetZoom,
    Triage,
}

/// Keyboard binding. Shift strides 100 records, Ctrl/Cmd strides 10.
pub fn command_for_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<Command> {
    let stride = if modifiers.shift {
        100
    } else if modifiers.command {
        10
    } else {
        1
    };

    match key {
        egui::Key::ArrowRight => Some(Command::Step(stride)),
        egui::Key::ArrowLeft => Some(Command::Step(-stride)),
        egui::Key::Space => Some(Command::TogglePlayback),
        egui::Key::X => Some(Command::AdjustSpeed(-SPEED_STEP)),
        egui::Key::C => Some(Command::AdjustSpeed(SPEED_STEP)),
        egui::Key::Delete => Some(Command::Triage),
        egui::Key::M => Some(Command::ToggleMode),
        egui::Key::R => Some(Command::ResetZoom),
        _ => None,
    }
}

/// Scan the configured roots and build a navigator over them.
pub fn load_navigator(settings: &Settings) -> Result<Navigator> {
    let images = scan_images(&settings.images_root, settings.quarantine.as_deref())
        .with_context(|| format!("Failed to scan {}", settings.images_root.display()))?;
    let dataset = Dataset::from_image_paths(&settings.images_root, &settings.annotations_root, images)?;
    let annotated = (0..dataset.len())
        .filter_map(|i| dataset.get(i))
        .filter(|record| record.has_annotation())
        .count();
    log::info!("{} of {} images have annotations", annotated, dataset.len());

    let renderer = OverlayRenderer::new(settings.kind, settings.mode);
    let navigator_settings = NavigatorSettings {
        colors: settings.colors.clone(),
        quarantine: settings.quarantine.clone(),
        zoom_limits: settings.zoom,
        display_size: settings.window_size,
    };
    Ok(Navigator::new(dataset, renderer, navigator_settings))
}

/// Short-lived message in the status bar.
struct StatusFlash {
    message: String,
    until: Instant,
}

/// Main application state.
pub struct ViewerApp {
    settings: Settings,
    navigator: Navigator,
    playback: PlaybackScheduler,

    /// Texture of the navigator's display buffer
    texture: Option<egui::TextureHandle>,

    /// Navigator generation the texture was built from
    uploaded_generation: Option<u64>,

    flash: Option<StatusFlash>,
}

impl ViewerApp {
    /// Load the dataset and select the first annotated record.
    pub fn new(settings: Settings) -> Result<Self> {
        let navigator = load_navigator(&settings)?;
        let playback = PlaybackScheduler::new(settings.scroll_speed);

        let mut app = Self {
            settings,
            navigator,
            playback,
            texture: None,
            uploaded_generation: None,
            flash: None,
        };
        app.show_first();
        Ok(app)
    }

    fn show_first(&mut self) {
        let status = self.navigator.advance(1);
        self.report_step(1, status);
    }

    fn flash(&mut self, message: impl Into<String>) {
        self.flash = Some(StatusFlash {
            message: message.into(),
            until: Instant::now() + FLASH_DURATION,
        });
    }

    fn report_step(&mut self, step: isize, status: crate::error::Result<StepStatus>) {
        match status {
            Ok(StepStatus::Moved(_)) => {}
            Ok(StepStatus::NoRecord) if self.navigator.current_index().is_none() => {
                self.flash("No annotated images found");
            }
            Ok(StepStatus::NoRecord) if step < 0 => self.flash("Reached start of images"),
            Ok(StepStatus::NoRecord) => self.flash("Reached end of images"),
            Err(e) => self.flash(e.to_string()),
        }
    }

    /// Carry out one user command.
    pub fn execute(&mut self, command: Command, now: Instant) {
        match command {
            Command::Step(step) => {
                let status = self.navigator.advance(step);
                self.report_step(step, status);
            }
            Command::TogglePlayback => self.playback.toggle(now),
            Command::AdjustSpeed(delta) => {
                self.playback.adjust_speed(delta, now);
                self.flash(format!("Scroll speed: {:.1}s", self.playback.scroll_speed()));
            }
            Command::ToggleMode => match self.navigator.toggle_mode() {
                Some(mode) => self.flash(format!("Mode: {mode:?}")),
                None => self.flash("Mode switching applies to segmentation only"),
            },
            Command::ResetZoom => self.navigator.reset_zoom(),
            Command::Triage => self.triage_current(),
        }
    }

    fn triage_current(&mut self) {
        let caption = self.navigator.caption().unwrap_or_default();
        match self.navigator.delete_current() {
            Ok((outcome, status)) => {
                match outcome {
                    TriageOutcome::Quarantined { image, .. } => {
                        log::info!("Quarantined {} to {}", caption, image.display());
                        self.flash(format!("Quarantined {caption}"));
                    }
                    TriageOutcome::Deleted => {
                        log::info!("Deleted {}", caption);
                        self.flash(format!("Deleted {caption}"));
                    }
                }
                match status {
                    Ok(StepStatus::Moved(_)) => {}
                    Ok(StepStatus::NoRecord) => {
                        self.playback.stop();
                        self.flash("No annotated images left");
                    }
                    Err(e) => {
                        self.playback.stop();
                        self.flash(e.to_string());
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to triage {}: {}", caption, e);
                self.flash(format!("Triage failed: {e}"));
            }
        }
    }

    /// One playback step if one is due.
    fn tick_playback(&mut self, now: Instant) {
        if !self.playback.poll(now) {
            return;
        }
        match self.navigator.advance(1) {
            Ok(StepStatus::Moved(_)) => {}
            Ok(StepStatus::NoRecord) => {
                self.playback.stop();
                self.flash("Reached end of images");
            }
            Err(e) => {
                self.playback.stop();
                self.flash(e.to_string());
            }
        }
    }

    fn open_images_folder(&mut self, path: PathBuf) {
        if self.settings.annotations_root == self.settings.images_root {
            self.settings.annotations_root = path.clone();
        }
        self.settings.images_root = path;
        self.reload_dataset();
    }

    fn open_annotations_folder(&mut self, path: PathBuf) {
        self.settings.annotations_root = path;
        self.reload_dataset();
    }

    fn reload_dataset(&mut self) {
        self.playback.stop();
        match load_navigator(&self.settings) {
            Ok(navigator) => {
                self.navigator = navigator;
                self.uploaded_generation = None;
                self.show_first();
            }
            Err(e) => {
                log::error!("Failed to open dataset: {:#}", e);
                self.flash(format!("Failed to open dataset: {e:#}"));
            }
        }
    }

    /// Upload the display buffer when the navigator changed it.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.navigator.generation();
        if self.uploaded_generation == Some(generation) {
            return;
        }
        self.uploaded_generation = Some(generation);

        self.texture = self.navigator.display().map(|frame| {
            let size = [frame.width() as usize, frame.height() as usize];
            let color_image = egui::ColorImage::from_rgb(size, frame.as_raw());
            ctx.load_texture("current_frame", color_image, egui::TextureOptions::LINEAR)
        });

        let title = match self.navigator.caption() {
            Some(caption) => format!("annoview - {caption}"),
            None => "annoview".to_string(),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
    }

    fn schedule_repaint(&mut self, ctx: &egui::Context, now: Instant) {
        if let Some(delay) = self.playback.time_until_next(now) {
            ctx.request_repaint_after(delay);
        }
        match &self.flash {
            Some(flash) if now >= flash.until => self.flash = None,
            Some(flash) => ctx.request_repaint_after(flash.until - now),
            None => {}
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let mut commands = Vec::new();

        // Keyboard shortcuts, unless a text field has focus
        if !ctx.wants_keyboard_input() {
            ctx.input(|i| {
                for event in &i.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                    {
                        commands.extend(command_for_key(*key, *modifiers));
                    }
                }
            });
        }
        for command in commands.drain(..) {
            self.execute(command, now);
        }

        self.tick_playback(now);
        self.sync_texture(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Images Folder...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_images_folder(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Annotations Folder...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_annotations_folder(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Reset Zoom (R)").clicked() {
                        commands.push(Command::ResetZoom);
                        ui.close_menu();
                    }
                    let segmentation = self.navigator.renderer().mode().is_some();
                    if ui
                        .add_enabled(segmentation, egui::Button::new("Switch Merge/Split (M)"))
                        .clicked()
                    {
                        commands.push(Command::ToggleMode);
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_state = toolbar::ToolbarState {
            scrolling: self.playback.is_scrolling(),
            scroll_speed: self.playback.scroll_speed(),
            mode: self.navigator.renderer().mode(),
            position: self
                .navigator
                .current_index()
                .map(|index| (index, self.navigator.dataset().len())),
            can_triage: self.navigator.current_index().is_some(),
            quarantining: self.settings.quarantine.is_some(),
        };
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            commands.extend(toolbar::show(ui, &toolbar_state));
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.flash {
                Some(flash) => {
                    ui.label(egui::RichText::new(&flash.message).strong());
                }
                None => {
                    ui.label(
                        egui::RichText::new(
                            "←/→ step  Ctrl ±10  Shift ±100  Space play  X/C speed  Del triage  M mode  R reset",
                        )
                        .weak(),
                    );
                }
            });
        });

        // Annotation panel (right side)
        egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                let caption = self.navigator.caption();
                properties::show(
                    ui,
                    caption.as_deref(),
                    self.navigator.annotations(),
                    &self.settings.colors,
                    self.navigator.dataset(),
                );
            });

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let state = canvas::CanvasState {
                    texture: self.texture.as_ref(),
                    viewport: self.navigator.viewport(),
                    load_error: self.navigator.load_error(),
                    has_record: self.navigator.current_index().is_some(),
                };
                canvas::show(ui, &state)
            })
            .inner;

        if let canvas::CanvasAction::Zoom {
            pointer,
            display_size,
            steps,
        } = canvas_action
        {
            self.navigator.zoom(pointer, display_size, steps);
        }

        if !commands.is_empty() || canvas_action != canvas::CanvasAction::None {
            for command in commands {
                self.execute(command, now);
            }
            ctx.request_repaint();
        }

        self.schedule_repaint(ctx, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotationKind;
    use crate::models::viewport::ZoomLimits;
    use crate::render::composite::CompositeMode;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn settings(root: &Path, quarantine: Option<PathBuf>) -> Settings {
        Settings {
            images_root: root.to_path_buf(),
            annotations_root: root.to_path_buf(),
            quarantine,
            kind: AnnotationKind::Detection,
            mode: CompositeMode::Merge,
            scroll_speed: 0.5,
            zoom: ZoomLimits::default(),
            window_size: (1920, 1080),
            colors: Default::default(),
        }
    }

    fn write_record(root: &Path, name: &str, annotated: bool) {
        RgbImage::from_pixel(16, 16, Rgb([10, 10, 10]))
            .save(root.join(format!("{name}.png")))
            .unwrap();
        if annotated {
            fs::write(root.join(format!("{name}.txt")), "0 0.5 0.5 0.5 0.5\n").unwrap();
        }
    }

    #[test]
    fn test_key_bindings() {
        use egui::{Key, Modifiers};

        assert_eq!(command_for_key(Key::ArrowRight, Modifiers::NONE), Some(Command::Step(1)));
        assert_eq!(command_for_key(Key::ArrowLeft, Modifiers::NONE), Some(Command::Step(-1)));
        assert_eq!(command_for_key(Key::ArrowRight, Modifiers::COMMAND), Some(Command::Step(10)));
        assert_eq!(command_for_key(Key::ArrowLeft, Modifiers::SHIFT), Some(Command::Step(-100)));
        assert_eq!(command_for_key(Key::Space, Modifiers::NONE), Some(Command::TogglePlayback));
        assert_eq!(command_for_key(Key::X, Modifiers::NONE), Some(Command::AdjustSpeed(-SPEED_STEP)));
        assert_eq!(command_for_key(Key::C, Modifiers::NONE), Some(Command::AdjustSpeed(SPEED_STEP)));
        assert_eq!(command_for_key(Key::Delete, Modifiers::NONE), Some(Command::Triage));
        assert_eq!(command_for_key(Key::M, Modifiers::NONE), Some(Command::ToggleMode));
        assert_eq!(command_for_key(Key::R, Modifiers::NONE), Some(Command::ResetZoom));
        assert_eq!(command_for_key(Key::Q, Modifiers::NONE), None);
    }

    #[test]
    fn test_new_app_selects_first_annotated() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), "a", false);
        write_record(dir.path(), "b", true);

        let app = ViewerApp::new(settings(dir.path(), None)).unwrap();
        assert_eq!(app.navigator.current_index(), Some(1));
        assert!(app.flash.is_none());
    }

    #[test]
    fn test_empty_dataset_flashes() {
        let dir = TempDir::new().unwrap();
        let app = ViewerApp::new(settings(dir.path(), None)).unwrap();
        assert_eq!(app.navigator.current_index(), None);
        assert_eq!(app.flash.as_ref().unwrap().message, "No annotated images found");
    }

    #[test]
    fn test_step_past_end_flashes() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), "a", true);
        let mut app = ViewerApp::new(settings(dir.path(), None)).unwrap();

        app.execute(Command::Step(1), Instant::now());
        assert_eq!(app.flash.as_ref().unwrap().message, "Reached end of images");
        app.execute(Command::Step(-1), Instant::now());
        assert_eq!(app.flash.as_ref().unwrap().message, "Reached start of images");
    }

    #[test]
    fn test_playback_stops_at_end() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), "a", true);
        write_record(dir.path(), "b", true);
        let mut app = ViewerApp::new(settings(dir.path(), None)).unwrap();
        let start = Instant::now();

        app.execute(Command::TogglePlayback, start);
        app.tick_playback(start + Duration::from_secs(1));
        assert_eq!(app.navigator.current_index(), Some(1));
        assert!(app.playback.is_scrolling());

        app.tick_playback(start + Duration::from_secs(2));
        assert!(!app.playback.is_scrolling());
        assert_eq!(app.navigator.current_index(), Some(1));
    }

    #[test]
    fn test_triage_into_quarantine_inside_dataset() {
        let dir = TempDir::new().unwrap();
        let quarantine = dir.path().join("recycled");
        write_record(dir.path(), "a", true);
        write_record(dir.path(), "b", true);
        let mut app = ViewerApp::new(settings(dir.path(), Some(quarantine.clone()))).unwrap();

        app.execute(Command::Triage, Instant::now());
        assert!(quarantine.join("a.png").is_file());
        assert_eq!(app.navigator.caption().as_deref(), Some("b.png"));
        assert_eq!(app.flash.as_ref().unwrap().message, "Quarantined a.png");

        // Reopening does not pick the quarantined pair back up.
        app.reload_dataset();
        assert_eq!(app.navigator.dataset().len(), 1);
    }

    #[test]
    fn test_triage_reports_next_record_load_error() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), "a", true);
        write_record(dir.path(), "b", true);
        fs::write(dir.path().join("b.txt"), "1 bad\n").unwrap();
        let mut app = ViewerApp::new(settings(dir.path(), None)).unwrap();

        app.execute(Command::Triage, Instant::now());
        assert!(!dir.path().join("a.png").exists());
        assert_eq!(app.navigator.current_index(), Some(1));
        let message = &app.flash.as_ref().unwrap().message;
        assert!(message.contains("malformed annotation"), "{message}");
        assert!(!message.starts_with("Triage failed"));
    }

    #[test]
    fn test_speed_adjust_flashes_value() {
        let dir = TempDir::new().unwrap();
        let mut app = ViewerApp::new(settings(dir.path(), None)).unwrap();
        app.execute(Command::AdjustSpeed(SPEED_STEP), Instant::now());
        assert_eq!(app.flash.as_ref().unwrap().message, "Scroll speed: 0.6s");
    }
}
