// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Side panel listing the objects of the current record.

use crate::models::annotation::Annotation;
use crate::models::color_map::ClassColorMap;
use crate::models::dataset::Dataset;

/// Display the annotation list and dataset summary.
pub fn show(
    ui: &mut egui::Ui,
    caption: Option<&str>,
    annotations: &[Annotation],
    colors: &ClassColorMap,
    dataset: &Dataset,
) {
    ui.heading("Annotations");
    ui.separator();

    match caption {
        Some(caption) => {
            ui.label(egui::RichText::new(caption).monospace());
        }
        None => {
            ui.label(egui::RichText::new("No record selected").weak());
        }
    }
    ui.label(format!("{} objects", annotations.len()));
    ui.add_space(4.0);

    egui::ScrollArea::vertical()
        .max_height((ui.available_height() - 120.0).max(100.0))
        .show(ui, |ui| {
            for (idx, annotation) in annotations.iter().enumerate() {
                let class_id = annotation.class_id();
                let [r, g, b] = colors.color_for(class_id).0;
                let shape = match annotation {
                    Annotation::Box(_) => "box".to_string(),
                    Annotation::Polygon(p) => format!("{} points", p.points.len()),
                };

                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, egui::Color32::from_rgb(r, g, b));
                    ui.label(format!("{idx:>3}  class {class_id}  ({shape})"));
                });
            }
        });

    ui.separator();
    ui.heading("Dataset");
    egui::Grid::new("dataset_summary").num_columns(2).show(ui, |ui| {
        ui.label("Images");
        ui.label(dataset.images_root().display().to_string());
        ui.end_row();
        ui.label("Labels");
        ui.label(dataset.annotations_root().display().to_string());
        ui.end_row();
        ui.label("Records");
        ui.label(dataset.len().to_string());
        ui.end_row();
        ui.label("Colors");
        if colors.is_empty() {
            ui.label("none (all black)");
        } else {
            ui.label(format!("{} classes", colors.len()));
        }
        ui.end_row();
    });
}
