// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset navigation and the current-record state machine.
//!
//! The navigator owns the cursor into the dataset, the viewport over the
//! current frame, and the frame itself. Every mutation (stepping, zooming,
//! triage, mode switches) goes through it, on the UI thread.

use crate::error::{Result, ViewerError};
use crate::io::triage::{triage_record, TriageOutcome};
use crate::models::annotation::Annotation;
use crate::models::color_map::ClassColorMap;
use crate::models::dataset::Dataset;
use crate::models::viewport::{Viewport, ZoomLimits, ZoomOutcome};
use crate::render::composite::CompositeMode;
use crate::render::{LineThickness, OverlayRenderer, RenderContext, RenderedFrame};
use image::RgbImage;
use std::path::PathBuf;

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The cursor now points at this index.
    Moved(usize),
    /// No annotated record in that direction; the cursor did not move.
    NoRecord,
}

/// Session settings that do not change while navigating.
#[derive(Debug, Clone)]
pub struct NavigatorSettings {
    pub colors: ClassColorMap,
    pub quarantine: Option<PathBuf>,
    pub zoom_limits: ZoomLimits,
    /// Window size used to lay out split views.
    pub display_size: (u32, u32),
}

/// Everything known about the record under the cursor.
#[derive(Debug, Clone)]
struct Current {
    index: usize,
    frame: Option<RenderedFrame>,
    viewport: Option<Viewport>,
    display: Option<RgbImage>,
    error: Option<String>,
}

pub struct Navigator {
    dataset: Dataset,
    renderer: OverlayRenderer,
    settings: NavigatorSettings,
    current: Option<Current>,
    /// Bumped whenever the display buffer changes.
    generation: u64,
}

impl Navigator {
    pub fn new(dataset: Dataset, renderer: OverlayRenderer, settings: NavigatorSettings) -> Self {
        Self {
            dataset,
            renderer,
            settings,
            current: None,
            generation: 0,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(|c| c.index)
    }

    /// Caption for the record under the cursor.
    pub fn caption(&self) -> Option<String> {
        let index = self.current_index()?;
        self.dataset.get(index).map(|record| self.dataset.caption_for(record))
    }

    /// Display buffer with the viewport applied.
    pub fn display(&self) -> Option<&RgbImage> {
        self.current.as_ref()?.display.as_ref()
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.current
            .as_ref()
            .and_then(|c| c.frame.as_ref())
            .map(|f| f.annotations.as_slice())
            .unwrap_or(&[])
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.current.as_ref()?.viewport.as_ref()
    }

    /// Load failure of the record under the cursor, if any.
    pub fn load_error(&self) -> Option<&str> {
        self.current.as_ref()?.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Move the cursor by `step` records, skipping records without an
    /// annotation file.
    ///
    /// Once an unannotated record is hit the search continues one record at
    /// a time in the same direction. Crossing either end of the dataset
    /// leaves the cursor where it was and reports [`StepStatus::NoRecord`].
    /// A malformed annotation stops the search on that record and is
    /// returned as an error.
    pub fn advance(&mut self, step: isize) -> Result<StepStatus> {
        if step == 0 {
            return self.reload();
        }

        let len = self.dataset.len() as isize;
        let origin = self.current_index().map_or(-1, |i| i as isize);
        let mut index = origin;
        let mut shift = step;

        loop {
            index += shift;

            if index < 0 || index >= len {
                if index < 0 {
                    log::warn!("Reached start of images");
                } else {
                    log::warn!("Reached end of images");
                }
                return Ok(StepStatus::NoRecord);
            }

            if self.try_select(index as usize)? {
                return Ok(StepStatus::Moved(index as usize));
            }
            shift = shift.signum();
        }
    }

    /// Render `index` and make it current. `Ok(false)` means the record has
    /// no annotation file and the cursor is unchanged.
    fn try_select(&mut self, index: usize) -> Result<bool> {
        let Some(record) = self.dataset.get(index) else {
            return Ok(false);
        };
        let caption = self.dataset.caption_for(record);
        let ctx = RenderContext {
            colors: &self.settings.colors,
            thickness: LineThickness::for_scale(1.0),
            display_size: self.settings.display_size,
        };

        match self.renderer.render(record, &caption, &ctx) {
            Ok(frame) => {
                let viewport = Viewport::new(frame.image.dimensions(), self.settings.zoom_limits);
                self.current = Some(Current {
                    index,
                    display: Some(frame.image.clone()),
                    frame: Some(frame),
                    viewport: Some(viewport),
                    error: None,
                });
                self.generation += 1;
                Ok(true)
            }
            Err(err) if err.is_missing_annotation() => {
                log::debug!("Annotations for image {} not found", record.image_path.display());
                Ok(false)
            }
            Err(err) => {
                log::error!("Failed to load {}: {}", record.image_path.display(), err);
                self.current = Some(Current {
                    index,
                    frame: None,
                    viewport: None,
                    display: None,
                    error: Some(err.to_string()),
                });
                self.generation += 1;
                Err(err)
            }
        }
    }

    /// Read the current record from disk again.
    pub fn reload(&mut self) -> Result<StepStatus> {
        let Some(index) = self.current_index() else {
            return Ok(StepStatus::NoRecord);
        };
        if self.try_select(index)? {
            Ok(StepStatus::Moved(index))
        } else {
            // Annotation vanished underneath us.
            self.move_off_current()
        }
    }

    /// Leave a record that is no longer reachable: forward if possible, else
    /// backward, else become empty.
    fn move_off_current(&mut self) -> Result<StepStatus> {
        let mut status = self.advance(1)?;
        if status == StepStatus::NoRecord {
            status = self.advance(-1)?;
        }
        if status == StepStatus::NoRecord {
            log::warn!("No annotated images left");
            self.current = None;
            self.generation += 1;
        }
        Ok(status)
    }

    /// Redraw the overlay of the current record from the cached source image.
    fn redraw(&mut self, thickness: LineThickness) {
        let Some(record) = self.current_index().and_then(|i| self.dataset.get(i)) else {
            return;
        };
        let caption = self.dataset.caption_for(record);
        let ctx = RenderContext {
            colors: &self.settings.colors,
            thickness,
            display_size: self.settings.display_size,
        };

        let Some(current) = self.current.as_mut() else {
            return;
        };
        let Some(frame) = current.frame.as_mut() else {
            return;
        };
        frame.image = self.renderer.draw(frame.source.clone(), &frame.annotations, &caption, &ctx);
        frame.thickness = thickness;
    }

    /// Switch merge/split compositing for segmentation datasets. The
    /// viewport is reset because the frame size may change.
    pub fn toggle_mode(&mut self) -> Option<CompositeMode> {
        if !self.renderer.toggle_mode() {
            return None;
        }
        let mode = self.renderer.mode();
        log::info!("compositing mode set to {:?}", mode);

        self.redraw(LineThickness::for_scale(1.0));
        self.reset_zoom();
        mode
    }

    /// Apply wheel `steps` at `pointer`, given in display coordinates over a
    /// display area of `display_size`.
    pub fn zoom(&mut self, pointer: (f64, f64), display_size: (f64, f64), steps: i32) -> ZoomOutcome {
        let Some(viewport) = self.current.as_mut().and_then(|c| c.viewport.as_mut()) else {
            return ZoomOutcome::Unchanged;
        };
        let outcome = viewport.zoom_at(pointer, display_size, steps);
        let scale = viewport.scale();

        if let ZoomOutcome::Zoomed { redraw_overlay } = outcome {
            if redraw_overlay {
                self.redraw(LineThickness::for_scale(scale));
            }
            self.update_display();
        }
        outcome
    }

    /// Return to the identity viewport.
    pub fn reset_zoom(&mut self) {
        let limits = self.settings.zoom_limits;
        let needs_redraw = match self.current.as_ref().and_then(|c| c.frame.as_ref()) {
            Some(frame) => frame.thickness != LineThickness::for_scale(1.0),
            None => return,
        };
        if needs_redraw {
            self.redraw(LineThickness::for_scale(1.0));
        }
        if let Some(current) = self.current.as_mut() {
            if let Some(frame) = current.frame.as_ref() {
                current.viewport = Some(Viewport::new(frame.image.dimensions(), limits));
            }
        }
        self.update_display();
    }

    fn update_display(&mut self) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if let (Some(frame), Some(viewport)) = (current.frame.as_ref(), current.viewport.as_ref()) {
            current.display = Some(viewport.apply(&frame.image));
            self.generation += 1;
        }
    }

    /// Quarantine (or delete) the current record and move on.
    ///
    /// On a filesystem error nothing is moved and the cursor stays put. After
    /// a successful triage the cursor advances; at the end of the dataset it
    /// falls back to the previous annotated record, and when none is left
    /// the navigator becomes empty. The returned step result carries any
    /// load error of the record landed on.
    pub fn delete_current(&mut self) -> Result<(TriageOutcome, Result<StepStatus>)> {
        let index = self.current_index().ok_or(ViewerError::NoCurrentRecord)?;
        let record = self
            .dataset
            .get(index)
            .cloned()
            .ok_or(ViewerError::NoCurrentRecord)?;

        let outcome = triage_record(&self.dataset, &record, self.settings.quarantine.as_deref())?;

        // The pair is gone either way; a load failure of the next record is
        // reported alongside the outcome.
        let status = self.move_off_current();
        Ok((outcome, status))
    }
}
