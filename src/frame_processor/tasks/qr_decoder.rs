// SPDX-License-Identifier: GPL-3.0-only

//! QR code decoding task
//!
//! This module implements the [`Decoder`] trait using the rqrr crate.
//! Crops larger than the configured maximum dimension are downscaled first,
//! then the decode heuristics retry on contrast-stretched and inverted
//! copies when the plain image yields nothing.

use super::prepare::{inverted, stretch_contrast};
use super::{DecodeRequest, Decoder};
use crate::errors::DecodeResult;
use crate::frame_processor::types::{Decoded, Symbology};
use image::GrayImage;
use image::imageops::{self, FilterType};
use std::borrow::Cow;
use tracing::{debug, trace};

/// QR code decoder
///
/// Optimized for real-time processing with frame downscaling. rqrr locates
/// codes at any orientation, so `try_rotate` needs no extra pass.
pub struct QrDecoder {
    /// Maximum dimension for processing (crops are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {
            // QR codes are typically large enough to be detected at 640px
            max_dimension: 640,
        }
    }

    /// Create a QR decoder with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    fn downscale<'a>(&self, image: &'a GrayImage) -> Cow<'a, GrayImage> {
        let (width, height) = image.dimensions();
        if width <= self.max_dimension && height <= self.max_dimension {
            return Cow::Borrowed(image);
        }

        let scale = (width as f32 / self.max_dimension as f32)
            .max(height as f32 / self.max_dimension as f32);
        let new_width = ((width as f32 / scale) as u32).max(1);
        let new_height = ((height as f32 / scale) as u32).max(1);
        trace!(width, height, new_width, new_height, "Downscaling crop for QR decode");
        Cow::Owned(imageops::resize(image, new_width, new_height, FilterType::Triangle))
    }
}

impl Decoder for QrDecoder {
    fn decode(
        &self,
        image: &GrayImage,
        request: &DecodeRequest<'_>,
    ) -> DecodeResult<Option<Decoded>> {
        if !request.allows(Symbology::Qr) {
            return Ok(None);
        }

        let start = std::time::Instant::now();
        let image = self.downscale(image);

        let mut found = scan(&image);

        if found.is_none() && request.try_harder {
            if let Some(stretched) = stretch_contrast(&image) {
                trace!("Retrying QR decode on contrast-stretched image");
                found = scan(&stretched);
            }
        }

        if found.is_none() && request.try_invert {
            trace!("Retrying QR decode on inverted image");
            found = scan(&inverted(&image));
        }

        trace!(
            found = found.is_some(),
            decode_ms = start.elapsed().as_millis(),
            "QR decode complete"
        );

        Ok(found.map(|text| Decoded::new(text, Symbology::Qr)))
    }
}

/// Run rqrr over one image and return the first decodable code
fn scan(image: &GrayImage) -> Option<String> {
    let (width, height) = image.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            image.get_pixel(x as u32, y as u32).0[0]
        });

    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((meta, content)) => {
                debug!(version = meta.version.0, "Decoded QR code");
                return Some(content);
            }
            Err(e) => {
                // Located but unreadable (blur, glare); the next frame gets another chance
                debug!(error = ?e, "Failed to decode QR grid");
            }
        }
    }

    None
}
