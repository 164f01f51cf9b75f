// SPDX-License-Identifier: GPL-3.0-only

//! Decoder abstraction and implementations
//!
//! The pipeline treats optical decoding as an external capability behind
//! the [`Decoder`] trait. [`QrDecoder`] is the bundled implementation.

pub mod prepare;
pub mod qr_decoder;

pub use qr_decoder::QrDecoder;

use crate::config::Options;
use crate::errors::DecodeResult;
use crate::frame_processor::types::{Decoded, Symbology};
use image::GrayImage;

/// Parameters for one decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRequest<'a> {
    /// Symbologies the decoder may report
    pub symbologies: &'a [Symbology],
    pub try_harder: bool,
    pub try_invert: bool,
    pub try_rotate: bool,
}

impl<'a> DecodeRequest<'a> {
    /// Build a request from session options, passing the heuristic flags through
    pub fn from_options(options: &'a Options) -> Self {
        Self {
            symbologies: options.symbologies(),
            try_harder: options.try_harder,
            try_invert: options.try_invert,
            try_rotate: options.try_rotate,
        }
    }

    /// Whether `symbology` is allowed by this request
    pub fn allows(&self, symbology: Symbology) -> bool {
        self.symbologies.contains(&symbology)
    }
}

/// Optical code decoder
///
/// Implementations must not depend on pipeline state; the same image and
/// request always give the same answer. Calls may block for the duration of
/// the scan.
pub trait Decoder: Send + Sync {
    /// Decode at most one code from a cropped luma image
    ///
    /// # Returns
    /// * `Ok(Some(decoded))` - A code was found
    /// * `Ok(None)` - No code in the image
    /// * `Err(DecodeError)` - The decoder failed on this image
    fn decode(&self, image: &GrayImage, request: &DecodeRequest<'_>)
    -> DecodeResult<Option<Decoded>>;
}
