// SPDX-License-Identifier: GPL-3.0-only

//! Adapters between the scanner core and the outside world
//!
//! - [`camera`]: frame source and torch traits, frame types and the frame loop
//! - [`file_source`]: frame source reading still images from disk

pub mod camera;
pub mod file_source;
