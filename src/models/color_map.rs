// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class id to overlay color mapping.

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Color used for any class id that has no explicit entry.
pub const DEFAULT_CLASS_COLOR: [u8; 3] = [0, 0, 0];

/// Per-class overlay colors, fixed for the whole session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassColorMap {
    colors: HashMap<u32, [u8; 3]>,
}

impl ClassColorMap {
    /// Color for `class_id`, falling back to [`DEFAULT_CLASS_COLOR`].
    pub fn color_for(&self, class_id: u32) -> Rgb<u8> {
        Rgb(self.colors.get(&class_id).copied().unwrap_or(DEFAULT_CLASS_COLOR))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromIterator<(u32, [u8; 3])> for ClassColorMap {
    fn from_iter<I: IntoIterator<Item = (u32, [u8; 3])>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}
