// SPDX-License-Identifier: GPL-3.0-only

//! Consumer-facing event contract
//!
//! The pipeline reports everything it learns through an [`EventSink`].
//! Sinks must hand events off without blocking the frame thread and must
//! preserve their order.

use crate::config::Options;
use crate::frame_processor::types::{CameraConfig, FrameGeometry, Symbology};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

/// Receiver of scanner events
pub trait EventSink: Send + Sync {
    /// Crop geometry changed; `None` means geometry is no longer available
    fn on_geometry_changed(&self, geometry: Option<&FrameGeometry>);

    /// Preview surface changed; `None` means the preview went away
    fn on_texture_changed(&self, config: Option<&CameraConfig>);

    /// Torch hardware turned on or off
    fn on_torch_state_changed(&self, enabled: bool);

    /// A code was decoded
    fn on_scan_result(&self, text: &str, symbology: Symbology);

    /// Decoding a frame failed
    fn on_scan_error(&self, message: &str);
}

/// Owned form of every sink callback
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ScannerEvent {
    GeometryChanged { geometry: Option<FrameGeometry> },
    TextureChanged { config: Option<CameraConfig> },
    TorchStateChanged { enabled: bool },
    ScanResult { text: String, symbology: Symbology },
    ScanError { message: String },
}

impl ScannerEvent {
    /// Deliver this event to a sink
    pub fn dispatch(&self, sink: &dyn EventSink) {
        match self {
            ScannerEvent::GeometryChanged { geometry } => sink.on_geometry_changed(geometry.as_ref()),
            ScannerEvent::TextureChanged { config } => sink.on_texture_changed(config.as_ref()),
            ScannerEvent::TorchStateChanged { enabled } => sink.on_torch_state_changed(*enabled),
            ScannerEvent::ScanResult { text, symbology } => sink.on_scan_result(text, *symbology),
            ScannerEvent::ScanError { message } => sink.on_scan_error(message),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    events: VecDeque<ScannerEvent>,
    draining: bool,
}

/// FIFO hand-off between event producers and a sink
///
/// Producers push without ever calling the sink, so they can do it while
/// holding their own locks. The first caller of [`drain_into`](Self::drain_into)
/// delivers everything queued, including events the sink pushes while it
/// runs. Concurrent callers return at once and leave their events to the
/// active drainer, so a sink may call back into its producer freely.
#[derive(Debug, Default)]
pub struct EventQueue {
    state: Mutex<QueueState>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, event: ScannerEvent) {
        self.lock().events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver queued events in order unless another caller already is
    pub fn drain_into(&self, sink: &dyn EventSink) {
        {
            let mut state = self.lock();
            if state.draining {
                return;
            }
            state.draining = true;
        }
        let _reset = DrainReset(self);

        loop {
            let next = {
                let mut state = self.lock();
                let next = state.events.pop_front();
                // Cleared under the same lock as the empty check so no push is stranded
                if next.is_none() {
                    state.draining = false;
                }
                next
            };
            match next {
                Some(event) => event.dispatch(sink),
                None => return,
            }
        }
    }
}

/// Frees the queue for the next drainer if a sink panics mid-delivery
struct DrainReset<'a>(&'a EventQueue);

impl Drop for DrainReset<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}

impl EventSink for EventQueue {
    fn on_geometry_changed(&self, geometry: Option<&FrameGeometry>) {
        self.push(ScannerEvent::GeometryChanged {
            geometry: geometry.copied(),
        });
    }

    fn on_texture_changed(&self, config: Option<&CameraConfig>) {
        self.push(ScannerEvent::TextureChanged {
            config: config.copied(),
        });
    }

    fn on_torch_state_changed(&self, enabled: bool) {
        self.push(ScannerEvent::TorchStateChanged { enabled });
    }

    fn on_scan_result(&self, text: &str, symbology: Symbology) {
        self.push(ScannerEvent::ScanResult {
            text: text.to_string(),
            symbology,
        });
    }

    fn on_scan_error(&self, message: &str) {
        self.push(ScannerEvent::ScanError {
            message: message.to_string(),
        });
    }
}

/// Sink forwarding events into an unbounded tokio channel
///
/// Sending never blocks, and the channel keeps events in order for the
/// consumer task on the other end.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<ScannerEvent>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<ScannerEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: ScannerEvent) {
        if self.sender.send(event).is_err() {
            trace!("Event receiver dropped, discarding event");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_geometry_changed(&self, geometry: Option<&FrameGeometry>) {
        self.send(ScannerEvent::GeometryChanged {
            geometry: geometry.copied(),
        });
    }

    fn on_texture_changed(&self, config: Option<&CameraConfig>) {
        self.send(ScannerEvent::TextureChanged {
            config: config.copied(),
        });
    }

    fn on_torch_state_changed(&self, enabled: bool) {
        self.send(ScannerEvent::TorchStateChanged { enabled });
    }

    fn on_scan_result(&self, text: &str, symbology: Symbology) {
        self.send(ScannerEvent::ScanResult {
            text: text.to_string(),
            symbology,
        });
    }

    fn on_scan_error(&self, message: &str) {
        self.send(ScannerEvent::ScanError {
            message: message.to_string(),
        });
    }
}

/// Consumer-side scan delay policy
///
/// Wraps another sink and holds off scan events after one is forwarded:
/// `scan_delay_success_ms` after a result, `scan_delay_ms` after an error.
/// Geometry, texture and torch events always pass through.
pub struct DelayedSink<S> {
    inner: S,
    scan_delay: Duration,
    scan_delay_success: Duration,
    hold_until: Mutex<Option<Instant>>,
}

impl<S: EventSink> DelayedSink<S> {
    pub fn new(inner: S, options: &Options) -> Self {
        Self {
            inner,
            scan_delay: options.scan_delay(),
            scan_delay_success: options.scan_delay_success(),
            hold_until: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Claim the right to forward a scan event, starting a new hold-off
    fn try_claim(&self, hold: Duration) -> bool {
        let now = Instant::now();
        let mut hold_until = self.hold_until.lock().unwrap_or_else(|e| e.into_inner());
        if hold_until.is_some_and(|until| now < until) {
            return false;
        }
        *hold_until = Some(now + hold);
        true
    }
}

impl<S: EventSink> EventSink for DelayedSink<S> {
    fn on_geometry_changed(&self, geometry: Option<&FrameGeometry>) {
        self.inner.on_geometry_changed(geometry);
    }

    fn on_texture_changed(&self, config: Option<&CameraConfig>) {
        self.inner.on_texture_changed(config);
    }

    fn on_torch_state_changed(&self, enabled: bool) {
        self.inner.on_torch_state_changed(enabled);
    }

    fn on_scan_result(&self, text: &str, symbology: Symbology) {
        if self.try_claim(self.scan_delay_success) {
            self.inner.on_scan_result(text, symbology);
        } else {
            debug!(%symbology, "Scan result held back by scan delay");
        }
    }

    fn on_scan_error(&self, message: &str) {
        if self.try_claim(self.scan_delay) {
            self.inner.on_scan_error(message);
        } else {
            trace!("Scan error held back by scan delay");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn delayed(
        scan_delay_ms: u64,
        scan_delay_success_ms: u64,
    ) -> (DelayedSink<ChannelSink>, mpsc::UnboundedReceiver<ScannerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let options = Options {
            scan_delay_ms,
            scan_delay_success_ms,
            ..Options::default()
        };
        (DelayedSink::new(ChannelSink::new(tx), &options), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ScannerEvent>) -> Vec<ScannerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_channel_sink_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        sink.on_torch_state_changed(true);
        sink.on_scan_result("ABC", Symbology::Code128);
        sink.on_scan_error("boom");

        assert_eq!(
            drain(&mut rx),
            vec![
                ScannerEvent::TorchStateChanged { enabled: true },
                ScannerEvent::ScanResult {
                    text: "ABC".into(),
                    symbology: Symbology::Code128
                },
                ScannerEvent::ScanError {
                    message: "boom".into()
                },
            ]
        );
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelSink::new(tx).on_scan_error("nobody listening");
    }

    #[test]
    fn test_delayed_sink_holds_results_after_success() {
        let (sink, mut rx) = delayed(0, 60_000);
        sink.on_scan_result("first", Symbology::Qr);
        sink.on_scan_result("second", Symbology::Qr);
        sink.on_scan_error("suppressed too");
        sink.on_torch_state_changed(false);

        assert_eq!(
            drain(&mut rx),
            vec![
                ScannerEvent::ScanResult {
                    text: "first".into(),
                    symbology: Symbology::Qr
                },
                ScannerEvent::TorchStateChanged { enabled: false },
            ]
        );
    }

    #[test]
    fn test_delayed_sink_zero_delay_forwards_everything() {
        let (sink, mut rx) = delayed(0, 0);
        sink.on_scan_error("a");
        sink.on_scan_error("b");
        sink.on_scan_result("c", Symbology::Ean13);
        assert_eq!(drain(&mut rx).len(), 3);
    }

    #[test]
    fn test_delayed_sink_releases_after_delay() {
        let (sink, mut rx) = delayed(20, 20);
        sink.on_scan_error("a");
        sink.on_scan_error("b");
        std::thread::sleep(Duration::from_millis(50));
        sink.on_scan_error("c");

        let messages: Vec<_> = drain(&mut rx)
            .into_iter()
            .map(|event| match event {
                ScannerEvent::ScanError { message } => message,
                other => panic!("Unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(messages, vec!["a", "c"]);
    }

    /// Sink that pushes a follow-up event into the queue it is drained from
    struct EchoSink<'a> {
        queue: &'a EventQueue,
        received: Mutex<Vec<ScannerEvent>>,
    }

    impl EventSink for EchoSink<'_> {
        fn on_geometry_changed(&self, geometry: Option<&FrameGeometry>) {
            self.received
                .lock()
                .unwrap()
                .push(ScannerEvent::GeometryChanged {
                    geometry: geometry.copied(),
                });
        }

        fn on_texture_changed(&self, _config: Option<&CameraConfig>) {}

        fn on_torch_state_changed(&self, enabled: bool) {
            self.received
                .lock()
                .unwrap()
                .push(ScannerEvent::TorchStateChanged { enabled });
        }

        fn on_scan_result(&self, text: &str, symbology: Symbology) {
            self.received.lock().unwrap().push(ScannerEvent::ScanResult {
                text: text.to_string(),
                symbology,
            });
            self.queue.on_geometry_changed(None);
            // Re-entrant drain returns at once instead of recursing
            self.queue.drain_into(self);
        }

        fn on_scan_error(&self, _message: &str) {}
    }

    #[test]
    fn test_queue_delivers_in_push_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        let queue = EventQueue::new();
        queue.on_torch_state_changed(true);
        queue.on_scan_error("late");
        assert_eq!(queue.len(), 2);
        assert!(drain(&mut rx).is_empty());

        queue.drain_into(&sink);

        assert!(queue.is_empty());
        assert_eq!(
            drain(&mut rx),
            vec![
                ScannerEvent::TorchStateChanged { enabled: true },
                ScannerEvent::ScanError {
                    message: "late".into()
                },
            ]
        );
    }

    #[test]
    fn test_queue_delivers_events_pushed_by_the_sink() {
        let queue = EventQueue::new();
        let sink = EchoSink {
            queue: &queue,
            received: Mutex::new(Vec::new()),
        };
        queue.on_scan_result("A", Symbology::Qr);
        queue.on_torch_state_changed(false);

        queue.drain_into(&sink);

        assert!(queue.is_empty());
        assert_eq!(
            *sink.received.lock().unwrap(),
            vec![
                ScannerEvent::ScanResult {
                    text: "A".into(),
                    symbology: Symbology::Qr
                },
                ScannerEvent::TorchStateChanged { enabled: false },
                ScannerEvent::GeometryChanged { geometry: None },
            ]
        );
    }

    #[test]
    fn test_dispatch_calls_matching_callback() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        let event = ScannerEvent::ScanResult {
            text: "X".into(),
            symbology: Symbology::Aztec,
        };
        event.dispatch(&sink);
        assert_eq!(drain(&mut rx), vec![event]);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_string(&ScannerEvent::ScanResult {
            text: "4006381333931".into(),
            symbology: Symbology::Ean13,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"event":"scanResult","text":"4006381333931","symbology":"Ean13"}"#
        );
    }
}
