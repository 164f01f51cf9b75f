// SPDX-License-Identifier: GPL-3.0-only

//! Image preparation for decode retries
//!
//! Low-contrast or light-on-dark codes often fail on the raw luma crop.
//! These helpers produce alternative images for the decoder heuristics.

use crate::constants::prepare::{STRETCH_HIGH_PERCENTILE, STRETCH_LOW_PERCENTILE};
use image::GrayImage;

/// Return an inverted copy (light-on-dark codes become dark-on-light)
pub fn inverted(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    image::imageops::invert(&mut out);
    out
}

/// Stretch the luma histogram so the clipped range spans 0-255
///
/// Returns `None` when the image is flat and there is nothing to stretch.
pub fn stretch_contrast(image: &GrayImage) -> Option<GrayImage> {
    let total = image.as_raw().len();
    if total == 0 {
        return None;
    }

    let mut histogram = [0usize; 256];
    for &value in image.as_raw() {
        histogram[value as usize] += 1;
    }

    let low = percentile(&histogram, total * STRETCH_LOW_PERCENTILE / 100);
    let high = percentile(&histogram, total * STRETCH_HIGH_PERCENTILE / 100);
    if high <= low {
        return None;
    }

    let range = (high - low) as u32;
    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let clamped = (value as u8).clamp(low, high) - low;
        *slot = ((clamped as u32 * 255 + range / 2) / range) as u8;
    }

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    Some(out)
}

/// Smallest luma value with more than `rank` pixels at or below it
fn percentile(histogram: &[usize; 256], rank: usize) -> u8 {
    let mut seen = 0;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > rank {
            return value as u8;
        }
    }
    255
}
