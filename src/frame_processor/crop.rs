// SPDX-License-Identifier: GPL-3.0-only

//! Crop planning
//!
//! The scan region is a square centered in the frame whose side is a
//! fraction of the frame height, so the viewfinder overlay drawn by the UI
//! matches what the decoder sees.

use crate::frame_processor::types::{CropRect, FrameGeometry};

/// Compute the centered square crop for a frame
///
/// `crop_percent` is expected to be in `(0, 1]`; options are validated
/// before they reach here. Frames must be at least 1x1.
pub fn compute_crop(frame_width: u32, frame_height: u32, crop_percent: f64) -> CropRect {
    let limit = frame_width.min(frame_height);
    let side = (frame_height as f64 * crop_percent).round();
    let side = (side.max(1.0) as u32).min(limit);

    let left = (frame_width - side) / 2;
    let top = (frame_height - side) / 2;

    CropRect {
        left,
        top,
        right: left + side,
        bottom: top + side,
    }
}

/// Compute the full geometry report for a frame
pub fn plan_geometry(
    frame_width: u32,
    frame_height: u32,
    rotation_degrees: i32,
    crop_percent: f64,
) -> FrameGeometry {
    FrameGeometry {
        crop_rect: compute_crop(frame_width, frame_height, crop_percent),
        width: frame_width,
        height: frame_height,
        rotation_degrees,
    }
}
