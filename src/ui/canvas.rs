// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Central canvas showing the current display buffer.
//!
//! The buffer is scaled to fit the panel. Wheel input over the image is
//! reported back as a zoom request in displayed-image coordinates.

use crate::models::viewport::Viewport;
use crate::util::geometry::fit_within;

/// Result of canvas interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    None,
    Zoom {
        pointer: (f64, f64),
        display_size: (f64, f64),
        steps: i32,
    },
}

/// What the canvas has to show this frame.
pub struct CanvasState<'a> {
    pub texture: Option<&'a egui::TextureHandle>,
    pub viewport: Option<&'a Viewport>,
    pub load_error: Option<&'a str>,
    pub has_record: bool,
}

/// Display the main canvas area and handle mouse interactions.
pub fn show(ui: &mut egui::Ui, state: &CanvasState) -> CanvasAction {
    let mut action = CanvasAction::None;
    let mut hovered_pixel = None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        match (state.texture, state.load_error) {
            (_, Some(error)) => message(ui, "Cannot display this record", error),
            (Some(texture), None) => {
                let [width, height] = texture.size();
                let available = ui.available_size();
                let (display_width, display_height) =
                    fit_within((width as f32, height as f32), (available.x, available.y));

                // Center the image
                let x_offset = (available.x - display_width) / 2.0;
                let y_offset = (available.y - display_height) / 2.0;
                let image_rect = egui::Rect::from_min_size(
                    ui.min_rect().min + egui::vec2(x_offset, y_offset),
                    egui::vec2(display_width, display_height),
                );

                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let response = ui.allocate_rect(image_rect, egui::Sense::hover());
                if let Some(pos) = response.hover_pos() {
                    let pointer = ((pos.x - image_rect.min.x) as f64, (pos.y - image_rect.min.y) as f64);
                    let display_size = (display_width as f64, display_height as f64);

                    if let Some(viewport) = state.viewport {
                        hovered_pixel = Some(viewport.display_to_image(pointer, display_size));
                    }

                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        action = CanvasAction::Zoom {
                            pointer,
                            display_size,
                            steps: if scroll > 0.0 { 1 } else { -1 },
                        };
                    }
                }
            }
            (None, None) if state.has_record => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Loading image...").color(egui::Color32::WHITE));
                });
            }
            (None, None) => message(
                ui,
                "No annotated images",
                "Open a dataset folder with File → Open Images Folder...",
            ),
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        match state.viewport {
            Some(viewport) => {
                ui.label(format!("Zoom: {:.1}x", viewport.scale()));
                let (cx, cy) = viewport.center();
                ui.separator();
                ui.label(format!("Center: ({cx:.0}, {cy:.0})"));
            }
            None => {
                ui.label("No image");
            }
        }
        if let Some((x, y)) = hovered_pixel {
            ui.separator();
            ui.label(format!("Pixel: ({x:.0}, {y:.0})"));
        }
    });

    action
}

fn message(ui: &mut egui::Ui, title: &str, detail: &str) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new(title)
                    .size(24.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new(detail)
                    .weak()
                    .color(egui::Color32::from_gray(150)),
            );
        });
    });
}
