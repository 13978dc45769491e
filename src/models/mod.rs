// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data structures for datasets, annotations and the zoom viewport.

pub mod annotation;
pub mod color_map;
pub mod dataset;
pub mod viewport;
