// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor module
//!
//! Turns camera frames into a stable stream of scanner events: crop
//! planning, change gating, the per-frame decode pipeline and the session
//! that admits frames into it.

pub mod change_gate;
pub mod crop;
pub mod events;
pub mod pipeline;
pub mod session;
pub mod tasks;
pub mod types;

pub use change_gate::ChangeGate;
pub use crop::compute_crop;
pub use events::{ChannelSink, DelayedSink, EventQueue, EventSink, ScannerEvent};
pub use pipeline::{DecodePipeline, PipelineResult};
pub use session::{DropReason, FrameAdmission, SessionController, SessionState};
pub use tasks::{DecodeRequest, Decoder, QrDecoder};
pub use types::{CameraConfig, CropRect, DecodeOutcome, Decoded, FrameGeometry, Symbology};
