// SPDX-License-Identifier: GPL-3.0-only

//! Barcode Scanner - real-time optical code scanning core
//!
//! This library turns a stream of raw camera frames into a debounced stream
//! of decode results, while reporting the live crop geometry to the UI.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`frame_processor`]: crop planning, change gating, decode pipeline and session control
//! - [`backends`]: frame source and torch traits, frame types, frame loop, image file source
//! - [`flash`]: sysfs torch implementation
//! - [`config`]: scanner options
//! - [`errors`]: error types
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let session = SessionController::new(Arc::new(QrDecoder::new()), Arc::new(ChannelSink::new(tx)));
//! session.start(Options::default())?;
//! session.submit_frame(&frame);
//! while let Some(event) = rx.recv().await { /* ... */ }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod frame_processor;

// Re-export commonly used types
pub use backends::camera::{Frame, FrameSource, PixelFormat, TorchHardware};
pub use config::Options;
pub use errors::{ConfigError, DecodeError, FrameError};
pub use frame_processor::{
    DecodeOutcome, Decoder, EventSink, FrameAdmission, FrameGeometry, ScannerEvent,
    SessionController, Symbology,
};
