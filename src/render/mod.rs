// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay rendering.
//!
//! Turns an image and its annotation file into a single raster with the
//! annotations burned in. Detection boxes are drawn as outlines with their
//! class id; segmentation polygons are filled into a mask that is then
//! composited with the image.

pub mod composite;
pub mod draw;

use crate::error::Result;
use crate::io::media::load_image;
use crate::models::annotation::{load_annotations, Annotation, AnnotationKind};
use crate::models::color_map::ClassColorMap;
use crate::models::dataset::ImageRecord;
use crate::util::geometry::{box_to_pixel_rect, denormalize_coordinates};
use composite::{composite, CompositeMode};
use draw::{draw_hollow_rect, draw_text, fill_polygon, GLYPH_SIZE};
use image::{Rgb, RgbImage};

/// Zoom level at which strokes switch from thin to thick.
pub const THICKNESS_SCALE_THRESHOLD: f64 = 1.5;

const CAPTION_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const CAPTION_ORIGIN: (i64, i64) = (0, 25);
const CAPTION_SCALE: u32 = 2;
const LABEL_GAP: i64 = 5;
const MASK_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Stroke weight for boxes and labels, chosen by zoom bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineThickness {
    Thin,
    Thick,
}

impl LineThickness {
    pub fn for_scale(scale: f64) -> Self {
        if scale < THICKNESS_SCALE_THRESHOLD {
            LineThickness::Thin
        } else {
            LineThickness::Thick
        }
    }

    /// Stroke width in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            LineThickness::Thin => 1,
            LineThickness::Thick => 2,
        }
    }
}

/// Inputs shared by every render call of a session.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub colors: &'a ClassColorMap,
    pub thickness: LineThickness,
    /// Window size used to lay out split views.
    pub display_size: (u32, u32),
}

/// A record rendered at native resolution, before any viewport cropping.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub image: RgbImage,
    /// The image as decoded, kept so the overlay can be redrawn without
    /// touching the filesystem.
    pub source: RgbImage,
    pub annotations: Vec<Annotation>,
    pub thickness: LineThickness,
}

/// The two annotation encodings, sharing one render capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayRenderer {
    Detection,
    Segmentation { mode: CompositeMode },
}

impl OverlayRenderer {
    pub fn new(kind: AnnotationKind, mode: CompositeMode) -> Self {
        match kind {
            AnnotationKind::Detection => OverlayRenderer::Detection,
            AnnotationKind::Segmentation => OverlayRenderer::Segmentation { mode },
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            OverlayRenderer::Detection => AnnotationKind::Detection,
            OverlayRenderer::Segmentation { .. } => AnnotationKind::Segmentation,
        }
    }

    pub fn mode(&self) -> Option<CompositeMode> {
        match self {
            OverlayRenderer::Detection => None,
            OverlayRenderer::Segmentation { mode } => Some(*mode),
        }
    }

    /// Switch between merge and split. Returns false for detection datasets,
    /// which have a single presentation.
    pub fn toggle_mode(&mut self) -> bool {
        match self {
            OverlayRenderer::Detection => false,
            OverlayRenderer::Segmentation { mode } => {
                *mode = mode.toggled();
                true
            }
        }
    }

    /// Load a record's annotation file and image and burn the overlay in.
    ///
    /// The annotation file is read first so that unannotated records are
    /// rejected without decoding the image.
    pub fn render(&self, record: &ImageRecord, caption: &str, ctx: &RenderContext) -> Result<RenderedFrame> {
        let annotations = load_annotations(&record.annotation_path, self.kind())?;
        let image = load_image(&record.image_path)?;

        log::info!(
            "found {} annotations for image {}",
            annotations.len(),
            record.image_path.display()
        );

        let rendered = self.draw(image.clone(), &annotations, caption, ctx);
        Ok(RenderedFrame {
            image: rendered,
            source: image,
            annotations,
            thickness: ctx.thickness,
        })
    }

    /// Draw already parsed annotations onto `image`.
    pub fn draw(&self, image: RgbImage, annotations: &[Annotation], caption: &str, ctx: &RenderContext) -> RgbImage {
        let mut out = match self {
            OverlayRenderer::Detection => draw_boxes(image, annotations, ctx),
            OverlayRenderer::Segmentation { mode } => {
                let mask = polygon_mask(&image, annotations, ctx.colors);
                composite(*mode, image, &mask, ctx.display_size)
            }
        };
        draw_caption(&mut out, caption);
        out
    }
}

fn draw_boxes(mut image: RgbImage, annotations: &[Annotation], ctx: &RenderContext) -> RgbImage {
    let (width, height) = image.dimensions();
    let stroke = ctx.thickness.pixels();

    for annotation in annotations {
        let Annotation::Box(b) = annotation else {
            continue;
        };
        let color = ctx.colors.color_for(b.class_id);
        let rect = box_to_pixel_rect(b, width, height);

        draw_hollow_rect(&mut image, &rect, color, stroke);
        // Label sits above the top-left corner.
        let label_top = rect.y1 - LABEL_GAP - GLYPH_SIZE * stroke as i64;
        draw_text(&mut image, &b.class_id.to_string(), rect.x1, label_top, stroke, color);
    }

    image
}

/// Full-size white mask with every polygon filled in its class color.
fn polygon_mask(image: &RgbImage, annotations: &[Annotation], colors: &ClassColorMap) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut mask = RgbImage::from_pixel(width, height, MASK_BACKGROUND);

    for annotation in annotations {
        let Annotation::Polygon(polygon) = annotation else {
            continue;
        };
        let points: Vec<(f64, f64)> = polygon
            .points
            .iter()
            .map(|p| denormalize_coordinates(p, width, height))
            .collect();
        fill_polygon(&mut mask, &points, colors.color_for(polygon.class_id));
    }

    mask
}

fn draw_caption(image: &mut RgbImage, caption: &str) {
    let (x, baseline) = CAPTION_ORIGIN;
    let top = baseline - GLYPH_SIZE * CAPTION_SCALE as i64;
    draw_text(image, caption, x, top, CAPTION_SCALE, CAPTION_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{BoxAnnotation, Point, PolygonAnnotation};
    use std::path::PathBuf;

    const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

    fn colors() -> ClassColorMap {
        [(2, [255, 0, 0]), (5, [0, 0, 255])].into_iter().collect()
    }

    fn ctx(colors: &ClassColorMap, thickness: LineThickness) -> RenderContext<'_> {
        RenderContext {
            colors,
            thickness,
            display_size: (1920, 1080),
        }
    }

    #[test]
    fn test_thickness_brackets() {
        assert_eq!(LineThickness::for_scale(1.0), LineThickness::Thin);
        assert_eq!(LineThickness::for_scale(1.4), LineThickness::Thin);
        assert_eq!(LineThickness::for_scale(1.5), LineThickness::Thick);
        assert_eq!(LineThickness::for_scale(4.0), LineThickness::Thick);
    }

    #[test]
    fn test_box_drawn_in_class_color() {
        let colors = colors();
        let image = RgbImage::from_pixel(1000, 1000, GRAY);
        let annotations = vec![Annotation::Box(BoxAnnotation { class_id: 2, cx: 0.5, cy: 0.5, w: 0.2, h: 0.2 })];

        let out = OverlayRenderer::Detection.draw(image, &annotations, "", &ctx(&colors, LineThickness::Thin));

        let red = Rgb([255, 0, 0]);
        assert_eq!(*out.get_pixel(400, 400), red);
        assert_eq!(*out.get_pixel(600, 600), red);
        assert_eq!(*out.get_pixel(500, 400), red);
        assert_eq!(*out.get_pixel(600, 500), red);
        assert_eq!(*out.get_pixel(500, 500), GRAY);
        assert_eq!(*out.get_pixel(399, 500), GRAY);
        // Label occupies the band just above the box.
        let label_band = (387..395).flat_map(|y| (400..408).map(move |x| (x, y)));
        assert!(label_band.into_iter().any(|(x, y)| *out.get_pixel(x, y) == red));
    }

    #[test]
    fn test_caption_burned_in_black() {
        let colors = colors();
        let image = RgbImage::from_pixel(300, 100, GRAY);
        let out = OverlayRenderer::Detection.draw(image, &[], "a/b.png", &ctx(&colors, LineThickness::Thin));

        let caption_pixels = (9..25)
            .flat_map(|y| (0..112).map(move |x| (x, y)))
            .filter(|&(x, y)| *out.get_pixel(x, y) == Rgb([0, 0, 0]))
            .count();
        assert!(caption_pixels > 0);
        assert_eq!(*out.get_pixel(299, 99), GRAY);
    }

    #[test]
    fn test_polygon_merge_tints_inside_only() {
        let colors = colors();
        let image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let annotations = vec![Annotation::Polygon(PolygonAnnotation {
            class_id: 5,
            points: vec![Point::new(0.4, 0.4), Point::new(0.9, 0.4), Point::new(0.9, 0.9), Point::new(0.4, 0.9)],
        })];
        let renderer = OverlayRenderer::Segmentation { mode: CompositeMode::Merge };

        let out = renderer.draw(image, &annotations, "", &ctx(&colors, LineThickness::Thin));

        assert_eq!(out.dimensions(), (100, 100));
        // Inside: 0.3 * blue mask.
        assert_eq!(*out.get_pixel(60, 60), Rgb([0, 0, 77]));
        // Outside: 0.3 * white mask.
        assert_eq!(*out.get_pixel(30, 80), Rgb([77, 77, 77]));
    }

    #[test]
    fn test_polygon_split_doubles_width() {
        let colors = colors();
        let image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let annotations = vec![Annotation::Polygon(PolygonAnnotation {
            class_id: 5,
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)],
        })];
        let renderer = OverlayRenderer::Segmentation { mode: CompositeMode::Split };

        let out = renderer.draw(image, &annotations, "", &ctx(&colors, LineThickness::Thin));

        assert_eq!(out.dimensions(), (200, 100));
        assert_eq!(*out.get_pixel(50, 60), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(150, 60), Rgb([0, 0, 255]));
    }

    #[test]
    fn test_toggle_mode_only_for_segmentation() {
        let mut detection = OverlayRenderer::Detection;
        assert!(!detection.toggle_mode());
        assert_eq!(detection.mode(), None);

        let mut segmentation = OverlayRenderer::new(AnnotationKind::Segmentation, CompositeMode::Merge);
        assert!(segmentation.toggle_mode());
        assert_eq!(segmentation.mode(), Some(CompositeMode::Split));
    }

    #[test]
    fn test_render_missing_annotation_fails_before_decode() {
        let colors = colors();
        let record = ImageRecord {
            image_path: PathBuf::from("/nonexistent/img.png"),
            annotation_path: PathBuf::from("/nonexistent/img.txt"),
        };
        let err = OverlayRenderer::Detection
            .render(&record, "img.png", &ctx(&colors, LineThickness::Thin))
            .unwrap_err();
        assert!(err.is_missing_annotation());
    }
}
