// SPDX-License-Identifier: GPL-3.0-only
// Shared types for frame sources

//! Camera frame types
//!
//! A [`Frame`] keeps the sensor buffer shared and untouched until the
//! pipeline asks for a crop. Only the pixels inside the crop rectangle are
//! ever copied, and only their luma.

use crate::errors::FrameError;
use crate::frame_processor::types::CropRect;
use image::GrayImage;
use std::sync::Arc;
use std::time::Instant;

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Gray8 - 8-bit grayscale (single channel)
    #[default]
    Gray8,
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    Rgba8,
    /// NV21 - Semi-planar 4:2:0 (Y plane + interleaved VU plane)
    /// Standard Android camera preview format; only the Y plane is read
    Nv21,
}

impl PixelFormat {
    /// Bytes per pixel in the plane carrying luma
    pub fn luma_bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Gray8 | PixelFormat::Nv21 => 1,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Bytes of luma-plane data in one row of `width` pixels
    pub fn row_bytes(&self, width: u32) -> u64 {
        width as u64 * self.luma_bytes_per_pixel() as u64
    }
}

/// A single camera frame as delivered by a frame source
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Raw sensor bytes, shared with the source
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Row stride of the luma plane in bytes (may include padding)
    pub stride: u32,
    /// Clockwise sensor rotation, reported unchanged in the frame geometry
    pub rotation_degrees: i32,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl Frame {
    /// Wrap a tightly packed buffer
    pub fn new(
        data: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        let row_bytes = format.row_bytes(width);
        // No u32 stride can hold a row this long
        let stride = u32::try_from(row_bytes).map_err(|_| FrameError::InvalidStride {
            stride: u32::MAX,
            min: row_bytes,
        })?;
        Self::with_stride(data, width, height, stride, format)
    }

    /// Wrap a buffer whose rows are `stride` bytes apart
    pub fn with_stride(
        data: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        let frame = Self {
            width,
            height,
            data: data.into(),
            format,
            stride,
            rotation_degrees: 0,
            captured_at: Instant::now(),
        };
        frame.check_layout()?;
        Ok(frame)
    }

    /// Set the sensor rotation reported with this frame
    pub fn with_rotation(mut self, rotation_degrees: i32) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    /// Verify the buffer can hold the luma plane described by the header
    pub fn check_layout(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyDimensions);
        }
        let row_bytes = self.format.row_bytes(self.width);
        if (self.stride as u64) < row_bytes {
            return Err(FrameError::InvalidStride {
                stride: self.stride,
                min: row_bytes,
            });
        }
        let expected = (self.height as usize - 1) * self.stride as usize + row_bytes as usize;
        if self.data.len() < expected {
            return Err(FrameError::BufferTooSmall {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Copy the luma of the pixels inside `rect`
    ///
    /// Stride padding and everything outside the rectangle is skipped, so
    /// the full-resolution frame is never materialized.
    pub fn crop_luma(&self, rect: &CropRect) -> Result<GrayImage, FrameError> {
        self.check_layout()?;
        if !rect.fits_within(self.width, self.height) {
            return Err(FrameError::CropOutOfBounds);
        }

        let bpp = self.format.luma_bytes_per_pixel() as usize;
        let stride = self.stride as usize;
        let crop_width = rect.width() as usize;
        let mut luma = Vec::with_capacity(crop_width * rect.height() as usize);

        for y in rect.top as usize..rect.bottom as usize {
            let row_start = y * stride + rect.left as usize * bpp;
            let row = &self.data[row_start..row_start + crop_width * bpp];
            match self.format {
                PixelFormat::Gray8 | PixelFormat::Nv21 => luma.extend_from_slice(row),
                PixelFormat::Rgba8 => {
                    luma.extend(row.chunks_exact(4).map(|px| rgb_to_luma(px[0], px[1], px[2])))
                }
            }
        }

        GrayImage::from_raw(rect.width(), rect.height(), luma).ok_or(FrameError::CropOutOfBounds)
    }
}

/// BT.601 luma in fixed point
fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}
