// SPDX-License-Identifier: GPL-3.0-only

//! Scan session lifecycle and frame admission
//!
//! A [`SessionController`] owns the session state and decides which frames
//! get decoded. Admission is single-flight: while one frame is in the
//! pipeline, every other frame is dropped rather than queued, so a slow
//! decoder never builds a backlog. `start`, `reconfigure`, `stop` and
//! `release` wait for the in-flight frame to finish before swapping state.
//!
//! Events are queued while the state lock is held and delivered to the
//! sink only after it is released, so a sink may call back into the
//! session (for example `stop()` on the first result). Read accessors use
//! a separate snapshot and never compete with frame admission.

use crate::backends::camera::TorchHardware;
use crate::backends::camera::types::Frame;
use crate::config::Options;
use crate::errors::ConfigResult;
use crate::frame_processor::change_gate::ChangeGate;
use crate::frame_processor::events::{EventQueue, EventSink, ScannerEvent};
use crate::frame_processor::pipeline::{DecodePipeline, PipelineResult};
use crate::frame_processor::tasks::Decoder;
use crate::frame_processor::types::{CameraConfig, FrameGeometry};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Mutable state of one scan session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub options: Options,
    /// Remembers the last reported geometry
    pub geometry_gate: ChangeGate<FrameGeometry>,
    pub active: bool,
}

impl SessionState {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            geometry_gate: ChangeGate::new(),
            active: false,
        }
    }

    /// Geometry most recently reported to the sink
    pub fn previous_geometry(&self) -> Option<&FrameGeometry> {
        self.geometry_gate.last()
    }
}

/// What the read accessors see, refreshed whenever the state changes
#[derive(Debug, Clone)]
struct StatusSnapshot {
    options: Options,
    active: bool,
    geometry: Option<FrameGeometry>,
}

impl From<&SessionState> for StatusSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            options: state.options.clone(),
            active: state.active,
            geometry: state.previous_geometry().copied(),
        }
    }
}

/// Why a frame was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Session is not started
    Inactive,
    /// Another frame is in the pipeline or the session is being reconfigured
    Busy,
    /// The background task processing the frame did not complete
    Cancelled,
}

/// Result of submitting a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameAdmission {
    Processed(PipelineResult),
    Dropped(DropReason),
}

impl FrameAdmission {
    pub fn is_processed(&self) -> bool {
        matches!(self, FrameAdmission::Processed(_))
    }
}

/// Owns one scan session
///
/// Shared between the frame thread (`submit_frame`) and the control side
/// (`start`/`stop`/torch). All methods take `&self`.
pub struct SessionController {
    id: Uuid,
    decoder: Arc<dyn Decoder>,
    sink: Arc<dyn EventSink>,
    torch: Option<Arc<dyn TorchHardware>>,
    /// Held for the whole time a frame is in the pipeline
    state: Mutex<SessionState>,
    status: RwLock<StatusSnapshot>,
    texture_gate: Mutex<ChangeGate<CameraConfig>>,
    outbox: EventQueue,
}

impl SessionController {
    /// Create an inactive session
    pub fn new(decoder: Arc<dyn Decoder>, sink: Arc<dyn EventSink>) -> Self {
        let state = SessionState::new(Options::default());
        Self {
            id: Uuid::new_v4(),
            decoder,
            sink,
            torch: None,
            status: RwLock::new(StatusSnapshot::from(&state)),
            state: Mutex::new(state),
            texture_gate: Mutex::new(ChangeGate::new()),
            outbox: EventQueue::new(),
        }
    }

    /// Attach torch hardware for `set_torch_enabled`
    pub fn with_torch(mut self, torch: Arc<dyn TorchHardware>) -> Self {
        self.torch = Some(torch);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for any in-flight frame, then lock the state
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        // Decoder panics are caught inside the pipeline and the sink never
        // runs under this lock, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Refresh the accessor snapshot; call with the state lock held
    fn publish(&self, state: &SessionState) {
        *self.status.write().unwrap_or_else(|e| e.into_inner()) = StatusSnapshot::from(state);
    }

    fn status(&self) -> StatusSnapshot {
        self.status.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Deliver queued events to the sink outside every session lock
    fn flush_events(&self) {
        self.outbox.drain_into(self.sink.as_ref());
    }

    /// Validate `options` and activate the session with them
    ///
    /// On error nothing changes: an active session keeps running with its
    /// previous options.
    pub fn start(&self, options: Options) -> ConfigResult<()> {
        if let Err(e) = options.validate() {
            warn!(session = %self.id, error = %e, "Rejected scanner options");
            return Err(e);
        }

        let mut state = self.lock_state();
        state.options = options;
        state.geometry_gate.reset();
        state.active = true;
        self.publish(&state);
        info!(
            session = %self.id,
            crop_percent = state.options.crop_percent,
            qr_only = state.options.restrict_to_qr_family,
            "Scan session started"
        );
        Ok(())
    }

    /// Replace the options of the session
    ///
    /// Same as `stop()` followed by `start(options)`, done under one lock so
    /// no frame sees a half-applied configuration.
    pub fn reconfigure(&self, options: Options) -> ConfigResult<()> {
        debug!(session = %self.id, "Reconfiguring scan session");
        self.start(options)
    }

    /// Stop admitting frames
    ///
    /// Waits for an in-flight frame to finish; does not interrupt it.
    pub fn stop(&self) {
        let mut state = self.lock_state();
        if state.active {
            state.active = false;
            self.publish(&state);
            info!(session = %self.id, "Scan session stopped");
        }
    }

    /// Stop the session and report that geometry and preview are gone
    ///
    /// Call before tearing down the camera so no frame outlives it.
    pub fn release(&self) {
        {
            let mut state = self.lock_state();
            state.active = false;
            // Queued under the state lock so it follows the last frame's events
            if state.geometry_gate.reset().is_some() {
                self.outbox.push(ScannerEvent::GeometryChanged { geometry: None });
            }
            self.publish(&state);
        }

        self.report_preview(None);
        info!(session = %self.id, "Scan session released");
    }

    /// Whether frames are being admitted
    ///
    /// Never waits for, or competes with, an in-flight frame.
    pub fn is_active(&self) -> bool {
        self.status().active
    }

    /// Snapshot of the current options
    pub fn options(&self) -> Options {
        self.status().options
    }

    /// Geometry most recently reported to the sink
    pub fn previous_geometry(&self) -> Option<FrameGeometry> {
        self.status().geometry
    }

    /// Process a frame if the session is active and idle
    ///
    /// Frames arriving while another frame is being decoded are dropped.
    pub fn submit_frame(&self, frame: &Frame) -> FrameAdmission {
        let result = {
            let mut state = match self.state.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::WouldBlock) => {
                    trace!(session = %self.id, "Pipeline busy, dropping frame");
                    return FrameAdmission::Dropped(DropReason::Busy);
                }
                Err(TryLockError::Poisoned(e)) => e.into_inner(),
            };

            if !state.active {
                trace!(session = %self.id, "Session inactive, dropping frame");
                return FrameAdmission::Dropped(DropReason::Inactive);
            }

            let pipeline = DecodePipeline::new(self.decoder.as_ref(), &self.outbox);
            let result = pipeline.process_frame(frame, &mut state);
            if result.geometry_changed {
                self.publish(&state);
            }
            result
        };

        self.flush_events();
        FrameAdmission::Processed(result)
    }

    /// Process a frame on tokio's blocking pool
    ///
    /// Same admission rules as [`submit_frame`](Self::submit_frame).
    pub async fn submit_frame_async(self: Arc<Self>, frame: Arc<Frame>) -> FrameAdmission {
        tokio::task::spawn_blocking(move || self.submit_frame(&frame))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Frame processing task failed");
                FrameAdmission::Dropped(DropReason::Cancelled)
            })
    }

    /// Report the camera preview configuration
    ///
    /// `Some` is forwarded only when it differs from the last reported
    /// config. `None` (preview lost) is forwarded once if a config had been
    /// reported.
    pub fn report_preview(&self, config: Option<CameraConfig>) {
        {
            let mut gate = self.texture_gate.lock().unwrap_or_else(|e| e.into_inner());
            match config {
                Some(config) => {
                    if gate.admit(config) {
                        debug!(
                            session = %self.id,
                            texture_id = config.texture_id,
                            width = config.width,
                            height = config.height,
                            "Preview configuration changed"
                        );
                        self.outbox.on_texture_changed(Some(&config));
                    }
                }
                None => {
                    if gate.reset().is_some() {
                        debug!(session = %self.id, "Preview configuration lost");
                        self.outbox.on_texture_changed(None);
                    }
                }
            }
        }
        self.flush_events();
    }

    /// Ask the torch hardware to turn on or off
    ///
    /// The resulting state is reported separately through
    /// [`torch_state_changed`](Self::torch_state_changed) once the hardware
    /// confirms it.
    pub fn set_torch_enabled(&self, enabled: bool) {
        match &self.torch {
            Some(torch) => {
                debug!(session = %self.id, enabled, "Requesting torch state");
                torch.set_torch(enabled);
            }
            None => debug!(session = %self.id, "No torch hardware attached"),
        }
    }

    /// Relay an observed torch transition to the sink
    pub fn torch_state_changed(&self, enabled: bool) {
        info!(session = %self.id, enabled, "Torch state changed");
        self.outbox.on_torch_state_changed(enabled);
        self.flush_events();
    }
}
