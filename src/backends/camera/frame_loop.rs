// SPDX-License-Identifier: GPL-3.0-only
//! Thread lifecycle management for frame loops
//!
//! A frame source runs on its own thread and pushes every frame it produces
//! into a scan session. The session decides whether to decode or drop it.

use super::FrameSource;
use crate::frame_processor::session::{DropReason, FrameAdmission, SessionController};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Action returned by the loop callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a frame loop running in a separate thread
///
/// # Example
///
/// ```ignore
/// let session = Arc::new(SessionController::new(decoder, sink));
/// session.start(Options::default())?;
/// let mut frame_loop = FrameLoopController::run_source("camera", source, session.clone());
///
/// // Later: stop admitting frames, then tear down the camera
/// session.release();
/// frame_loop.stop();
/// ```
pub struct FrameLoopController {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<()>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    /// Name for logging
    name: String,
}

impl FrameLoopController {
    /// Start a new loop in a separate thread
    ///
    /// The provided closure is called repeatedly until it returns `LoopAction::Stop`
    /// or the controller's `stop()` method is called.
    pub fn start<F>(name: &str, mut loop_fn: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting frame loop");

        let thread_handle = thread::spawn(move || {
            debug!(name = %name_clone, "Frame loop thread started");

            loop {
                // Check stop signal first
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!(name = %name_clone, "Stop signal received");
                    break;
                }

                match loop_fn() {
                    LoopAction::Continue => {}
                    LoopAction::Stop => {
                        debug!(name = %name_clone, "Loop requested stop");
                        break;
                    }
                }
            }

            info!(name = %name_clone, "Frame loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Feed every frame of `source` into `session` until the source runs dry
    pub fn run_source<S>(name: &str, mut source: S, session: Arc<SessionController>) -> Self
    where
        S: FrameSource + 'static,
    {
        let loop_name = name.to_string();
        let mut processed = 0u64;
        let mut dropped = 0u64;

        Self::start(name, move || match source.next_frame() {
            Some(frame) => {
                match session.submit_frame(&frame) {
                    FrameAdmission::Processed(_) => processed += 1,
                    FrameAdmission::Dropped(DropReason::Inactive) => {
                        debug!(name = %loop_name, "Session inactive, frame ignored");
                        dropped += 1;
                    }
                    FrameAdmission::Dropped(_) => dropped += 1,
                }
                LoopAction::Continue
            }
            None => {
                info!(name = %loop_name, processed, dropped, "Frame source exhausted");
                LoopAction::Stop
            }
        })
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop (non-blocking)
    ///
    /// This sets the stop signal but doesn't wait for the thread to finish.
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting frame loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending stop signal
    ///
    /// Useful if the loop stops itself via `LoopAction::Stop`.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for frame loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Frame loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Frame loop thread finished");
            }
        }
    }
}

impl Drop for FrameLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "FrameLoopController dropped, stopping loop");
            self.stop();
        }
    }
}
