// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the two annotation encodings a dataset can carry
//! (detection boxes and segmentation polygons) and the parsers for their
//! plain-text, one-object-per-line file formats.

use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A 2D point with normalized coordinates (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which encoding the annotation files of a dataset use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// `class cx cy w h` per line.
    Detection,
    /// `class x1 y1 x2 y2 ... xn yn` per line.
    Segmentation,
}

/// A detection box in normalized center/extent form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxAnnotation {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// A segmentation polygon; the last point implicitly connects to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonAnnotation {
    pub class_id: u32,
    pub points: Vec<Point>,
}

/// One object read from an annotation file.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Box(BoxAnnotation),
    Polygon(PolygonAnnotation),
}

impl Annotation {
    pub fn class_id(&self) -> u32 {
        match self {
            Annotation::Box(b) => b.class_id,
            Annotation::Polygon(p) => p.class_id,
        }
    }
}

/// Read and parse an annotation file of the given kind.
///
/// A missing file yields [`ViewerError::AnnotationNotFound`]; any bad line
/// yields [`ViewerError::MalformedAnnotation`] so that corrupt data is never
/// mistaken for an unannotated image.
pub fn load_annotations(path: &Path, kind: AnnotationKind) -> Result<Vec<Annotation>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ViewerError::AnnotationNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    parse_annotations(&text, kind, path)
}

/// Parse annotation text. `path` is only used for error reporting.
pub fn parse_annotations(text: &str, kind: AnnotationKind, path: &Path) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = match kind {
            AnnotationKind::Detection => parse_box_line(line).map(Annotation::Box),
            AnnotationKind::Segmentation => parse_polygon_line(line).map(Annotation::Polygon),
        };
        match parsed {
            Ok(annotation) => annotations.push(annotation),
            Err(message) => {
                return Err(ViewerError::MalformedAnnotation {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message,
                });
            }
        }
    }

    Ok(annotations)
}

fn parse_box_line(line: &str) -> std::result::Result<BoxAnnotation, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 {
        return Err(format!("expected 5 fields, found {}", tokens.len()));
    }
    let class_id = parse_class_id(tokens[0])?;
    let values = tokens[1..]
        .iter()
        .map(|t| parse_coordinate(t))
        .collect::<std::result::Result<Vec<f64>, String>>()?;

    Ok(BoxAnnotation {
        class_id,
        cx: values[0],
        cy: values[1],
        w: values[2],
        h: values[3],
    })
}

fn parse_polygon_line(line: &str) -> std::result::Result<PolygonAnnotation, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let class_id = parse_class_id(tokens[0])?;

    let coordinates = &tokens[1..];
    if coordinates.len() % 2 != 0 {
        return Err(format!("odd number of coordinates ({})", coordinates.len()));
    }
    if coordinates.len() < 6 {
        return Err(format!(
            "polygon needs at least 3 points, found {}",
            coordinates.len() / 2
        ));
    }

    let points = coordinates
        .chunks_exact(2)
        .map(|pair| Ok(Point::new(parse_coordinate(pair[0])?, parse_coordinate(pair[1])?)))
        .collect::<std::result::Result<Vec<Point>, String>>()?;

    Ok(PolygonAnnotation { class_id, points })
}

/// Class ids are integers, but some exporters write them as `2.0`.
fn parse_class_id(token: &str) -> std::result::Result<u32, String> {
    if let Ok(id) = token.parse::<u32>() {
        return Ok(id);
    }
    match token.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        _ => Err(format!("invalid class id '{}'", token)),
    }
}

fn parse_coordinate(token: &str) -> std::result::Result<f64, String> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("invalid coordinate '{}'", token)),
    }
}
