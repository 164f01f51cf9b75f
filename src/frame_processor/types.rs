// SPDX-License-Identifier: GPL-3.0-only

//! Core types for frame processing results
//!
//! These types describe what the pipeline learned about a frame: where it
//! cropped, what it decoded, and what the preview surface looks like. They
//! are plain values compared by structural equality so they can be
//! de-duplicated with a [`ChangeGate`](super::change_gate::ChangeGate).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Optical code format of a decoded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    Qr,
    MicroQr,
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    Code39,
    Code93,
    Code128,
    Codabar,
    Itf,
    DataBar,
    DataBarExpanded,
    DataMatrix,
    Aztec,
    Pdf417,
    MaxiCode,
    /// Decoder reported a format outside the known set
    Unknown,
}

impl Symbology {
    /// Every decodable symbology (excludes `Unknown`)
    pub const ALL: &'static [Symbology] = &[
        Symbology::Qr,
        Symbology::MicroQr,
        Symbology::Ean8,
        Symbology::Ean13,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::Codabar,
        Symbology::Itf,
        Symbology::DataBar,
        Symbology::DataBarExpanded,
        Symbology::DataMatrix,
        Symbology::Aztec,
        Symbology::Pdf417,
        Symbology::MaxiCode,
    ];

    /// QR and Micro QR only
    pub const QR_FAMILY: &'static [Symbology] = &[Symbology::Qr, Symbology::MicroQr];

    /// Get display name for the symbology
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Qr => "QR Code",
            Self::MicroQr => "Micro QR Code",
            Self::Ean8 => "EAN-8",
            Self::Ean13 => "EAN-13",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Code39 => "Code 39",
            Self::Code93 => "Code 93",
            Self::Code128 => "Code 128",
            Self::Codabar => "Codabar",
            Self::Itf => "ITF",
            Self::DataBar => "DataBar",
            Self::DataBarExpanded => "DataBar Expanded",
            Self::DataMatrix => "Data Matrix",
            Self::Aztec => "Aztec",
            Self::Pdf417 => "PDF417",
            Self::MaxiCode => "MaxiCode",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Crop rectangle in frame pixel coordinates (right/bottom exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the rectangle is non-empty and lies within a `width x height` frame
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left < self.right && self.top < self.bottom && self.right <= width && self.bottom <= height
    }
}

/// Crop rectangle, dimensions and rotation of one camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameGeometry {
    pub crop_rect: CropRect,
    pub width: u32,
    pub height: u32,
    /// Clockwise sensor rotation relative to the display
    pub rotation_degrees: i32,
}

/// Camera preview surface configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Identifier of the texture the preview is rendered into
    pub texture_id: i64,
    pub width: u32,
    pub height: u32,
}

/// A code returned by a decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub symbology: Symbology,
}

impl Decoded {
    pub fn new(text: impl Into<String>, symbology: Symbology) -> Self {
        Self {
            text: text.into(),
            symbology,
        }
    }
}

/// Classified result of one frame's decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A code with non-blank text was decoded
    Found { text: String, symbology: Symbology },
    /// No code, or only blank text, in this frame
    NotFound,
    /// The decoder failed on this frame
    Error { message: String },
}

impl DecodeOutcome {
    /// Whether this outcome produces a consumer event
    pub fn is_reported(&self) -> bool {
        !matches!(self, DecodeOutcome::NotFound)
    }
}
