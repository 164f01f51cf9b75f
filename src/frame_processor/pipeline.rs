// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame decode pipeline
//!
//! Each frame goes through the same steps:
//!
//! ```text
//! Received ─▶ Cropped ─▶ Decoded ──────▶ Emitted
//!                    └─▶ DecodeFailed ─▶ Emitted
//! ```
//!
//! Geometry is reported only when it changes, and always before the decode
//! result of the same frame. Positive decodes are reported every time, even
//! if identical to the previous one; "no code in this frame" is never
//! reported. Decode failures become `on_scan_error` events and never
//! escape the pipeline.

use crate::backends::camera::types::Frame;
use crate::errors::{DecodeError, DecodeResult};
use crate::frame_processor::crop::plan_geometry;
use crate::frame_processor::events::EventSink;
use crate::frame_processor::session::SessionState;
use crate::frame_processor::tasks::{DecodeRequest, Decoder};
use crate::frame_processor::types::{CropRect, DecodeOutcome, Decoded, FrameGeometry};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

/// What happened to one processed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    /// Geometry of the frame, `None` if the frame header was unusable
    pub geometry: Option<FrameGeometry>,
    /// Whether a geometry-changed event was emitted for this frame
    pub geometry_changed: bool,
    pub outcome: DecodeOutcome,
}

/// Drives a [`Decoder`] over frames and reports to an [`EventSink`]
pub struct DecodePipeline<'a> {
    decoder: &'a dyn Decoder,
    sink: &'a dyn EventSink,
}

impl<'a> DecodePipeline<'a> {
    pub fn new(decoder: &'a dyn Decoder, sink: &'a dyn EventSink) -> Self {
        Self { decoder, sink }
    }

    /// Crop, decode, classify and report one frame
    pub fn process_frame(&self, frame: &Frame, state: &mut SessionState) -> PipelineResult {
        if let Err(e) = frame.check_layout() {
            warn!(error = %e, "Rejecting malformed frame");
            let outcome = DecodeOutcome::Error {
                message: DecodeError::from(e).to_string(),
            };
            self.emit(&outcome);
            return PipelineResult {
                geometry: None,
                geometry_changed: false,
                outcome,
            };
        }

        let geometry = plan_geometry(
            frame.width,
            frame.height,
            frame.rotation_degrees,
            state.options.crop_percent,
        );

        let geometry_changed = state.geometry_gate.admit(geometry);
        if geometry_changed {
            debug!(
                width = geometry.width,
                height = geometry.height,
                rotation = geometry.rotation_degrees,
                crop_side = geometry.crop_rect.width(),
                "Frame geometry changed"
            );
            self.sink.on_geometry_changed(Some(&geometry));
        }

        let request = DecodeRequest::from_options(&state.options);
        let outcome = classify(self.run_decoder(frame, &geometry.crop_rect, &request));
        self.emit(&outcome);

        PipelineResult {
            geometry: Some(geometry),
            geometry_changed,
            outcome,
        }
    }

    /// Materialize the crop and call the decoder, converting panics to errors
    fn run_decoder(
        &self,
        frame: &Frame,
        crop: &CropRect,
        request: &DecodeRequest<'_>,
    ) -> DecodeResult<Option<Decoded>> {
        let image = frame.crop_luma(crop)?;
        let decoder = self.decoder;

        panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(&image, request))).unwrap_or_else(
            |payload| {
                let message = panic_message(payload.as_ref());
                warn!(error = %message, "Decoder panicked");
                Err(DecodeError::Panicked(message))
            },
        )
    }

    fn emit(&self, outcome: &DecodeOutcome) {
        match outcome {
            DecodeOutcome::Found { text, symbology } => {
                debug!(%symbology, len = text.len(), "Code found");
                self.sink.on_scan_result(text, *symbology);
            }
            DecodeOutcome::Error { message } => {
                debug!(error = %message, "Frame decode failed");
                self.sink.on_scan_error(message);
            }
            DecodeOutcome::NotFound => trace!("No code in frame"),
        }
    }
}

/// Turn a raw decoder answer into an outcome
///
/// Text is trimmed, and a code whose text is blank counts as no code.
pub fn classify(result: DecodeResult<Option<Decoded>>) -> DecodeOutcome {
    match result {
        Ok(Some(decoded)) => {
            let text = decoded.text.trim();
            if text.is_empty() {
                DecodeOutcome::NotFound
            } else {
                DecodeOutcome::Found {
                    text: text.to_string(),
                    symbology: decoded.symbology,
                }
            }
        }
        Ok(None) => DecodeOutcome::NotFound,
        Err(e) => DecodeOutcome::Error {
            message: e.to_string(),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
