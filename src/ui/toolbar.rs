// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with navigation, playback and triage controls.

use crate::app::Command;
use crate::playback::SPEED_STEP;
use crate::render::composite::CompositeMode;

/// Values shown in the toolbar.
pub struct ToolbarState {
    pub scrolling: bool,
    pub scroll_speed: f64,
    pub mode: Option<CompositeMode>,
    /// Zero-based cursor and dataset length.
    pub position: Option<(usize, usize)>,
    pub can_triage: bool,
    pub quarantining: bool,
}

/// Display the toolbar; returns the command of a clicked button.
pub fn show(ui: &mut egui::Ui, state: &ToolbarState) -> Option<Command> {
    let mut command = None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        for (label, step) in [("⏮", -100), ("⏪", -10), ("◀", -1), ("▶", 1), ("⏩", 10), ("⏭", 100)] {
            if ui.button(label).on_hover_text(format!("Step {step:+}")).clicked() {
                command = Some(Command::Step(step));
            }
        }

        ui.separator();

        let play_label = if state.scrolling { "⏸ Pause" } else { "▶ Play" };
        if ui.selectable_label(state.scrolling, play_label).clicked() {
            command = Some(Command::TogglePlayback);
        }
        if ui.button("−").on_hover_text("Shorter delay (X)").clicked() {
            command = Some(Command::AdjustSpeed(-SPEED_STEP));
        }
        ui.label(format!("{:.1}s", state.scroll_speed));
        if ui.button("+").on_hover_text("Longer delay (C)").clicked() {
            command = Some(Command::AdjustSpeed(SPEED_STEP));
        }

        if let Some(mode) = state.mode {
            ui.separator();
            if ui.selectable_label(mode == CompositeMode::Merge, "Merge").clicked() && mode != CompositeMode::Merge {
                command = Some(Command::ToggleMode);
            }
            if ui.selectable_label(mode == CompositeMode::Split, "Split").clicked() && mode != CompositeMode::Split {
                command = Some(Command::ToggleMode);
            }
        }

        ui.separator();

        if ui.button("Reset Zoom").clicked() {
            command = Some(Command::ResetZoom);
        }

        let triage_label = if state.quarantining { "🗑 Quarantine" } else { "🗑 Delete" };
        if ui.add_enabled(state.can_triage, egui::Button::new(triage_label)).clicked() {
            command = Some(Command::Triage);
        }

        ui.separator();

        let position = match state.position {
            Some((index, len)) => format!("{} / {}", index + 1, len),
            None => "– / –".to_string(),
        };
        ui.label(egui::RichText::new(position).monospace());
    });

    command
}
