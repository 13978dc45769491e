// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filesystem operations: image decoding, dataset scanning, settings files
//! and triage of bad samples.

pub mod media;
pub mod scan;
pub mod serialization;
pub mod triage;
