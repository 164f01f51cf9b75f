// SPDX-License-Identifier: GPL-3.0-only

//! Camera collaborator abstraction
//!
//! The scanner core never talks to a camera driver. Platform adapters
//! implement these traits instead:
//!
//! ```text
//! ┌──────────────┐   frames    ┌───────────────────┐   events   ┌───────────┐
//! │ FrameSource  │ ──────────▶ │ SessionController │ ─────────▶ │ EventSink │
//! └──────────────┘             └─────────┬─────────┘            └───────────┘
//!                                        │ set_torch
//!                                        ▼
//!                              ┌───────────────────┐
//!                              │  TorchHardware    │
//!                              └───────────────────┘
//! ```

pub mod frame_loop;
pub mod types;

pub use frame_loop::{FrameLoopController, LoopAction};
pub use types::{Frame, PixelFormat};

/// Supplier of camera frames
///
/// Called repeatedly from the frame loop thread. Frames keep their pixel
/// data in the source's buffer; the pipeline copies only the crop.
pub trait FrameSource: Send {
    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Torch (flash LED) control
///
/// `set_torch` is a request; implementations report the resulting state
/// change to whoever observes them, once per actual transition.
pub trait TorchHardware: Send + Sync {
    fn set_torch(&self, enabled: bool);
}
