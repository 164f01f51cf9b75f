// SPDX-License-Identifier: GPL-3.0-only

//! Fake collaborators shared by the integration tests
#![allow(dead_code)]

use barcode_scanner::errors::{DecodeError, DecodeResult};
use barcode_scanner::frame_processor::tasks::{DecodeRequest, Decoder};
use barcode_scanner::frame_processor::types::{CameraConfig, Decoded, FrameGeometry, Symbology};
use barcode_scanner::frame_processor::{EventSink, ScannerEvent};
use barcode_scanner::{Frame, PixelFormat};
use image::{GrayImage, Luma};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};

/// Uniform gray frame of the given size
pub fn gray_frame(width: u32, height: u32) -> Frame {
    Frame::new(
        vec![128u8; (width * height) as usize],
        width,
        height,
        PixelFormat::Gray8,
    )
    .expect("valid gray frame")
}

/// Render `text` as a dark-on-light QR code with a four-module quiet zone
pub fn render_qr(text: &str, module_px: u32) -> GrayImage {
    let code = qrcode::QrCode::new(text.as_bytes()).expect("encodable text");
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let quiet = 4;
    let side = (modules + 2 * quiet) * module_px;
    GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module_px, y / module_px);
        let span = quiet..quiet + modules;
        let dark = span.contains(&mx)
            && span.contains(&my)
            && colors[((my - quiet) * modules + (mx - quiet)) as usize] == qrcode::Color::Dark;
        Luma([if dark { 0 } else { 255 }])
    })
}

/// Sink that records every event in order
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ScannerEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ScannerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn scan_results(&self) -> Vec<(String, Symbology)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScannerEvent::ScanResult { text, symbology } => Some((text, symbology)),
                _ => None,
            })
            .collect()
    }

    pub fn scan_errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScannerEvent::ScanError { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn geometry_events(&self) -> Vec<Option<FrameGeometry>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScannerEvent::GeometryChanged { geometry } => Some(geometry),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ScannerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl EventSink for RecordingSink {
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

/// What a decoder was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub width: u32,
    pub height: u32,
    pub symbologies: Vec<Symbology>,
    pub try_harder: bool,
    pub try_invert: bool,
    pub try_rotate: bool,
}

/// Decoder answering from a script, then "no code" once the script is empty
#[derive(Default)]
pub struct ScriptedDecoder {
    script: Mutex<VecDeque<DecodeResult<Option<Decoded>>>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedDecoder {
    pub fn new(script: Vec<DecodeResult<Option<Decoded>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn found(text: &str, symbology: Symbology) -> DecodeResult<Option<Decoded>> {
        Ok(Some(Decoded::new(text, symbology)))
    }

    pub fn failure(message: &str) -> DecodeResult<Option<Decoded>> {
        Err(DecodeError::Failed(message.to_string()))
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Decoder for ScriptedDecoder {
    fn decode(
        &self,
        image: &GrayImage,
        request: &DecodeRequest<'_>,
    ) -> DecodeResult<Option<Decoded>> {
        self.seen.lock().unwrap().push(SeenRequest {
            width: image.width(),
            height: image.height(),
            symbologies: request.symbologies.to_vec(),
            try_harder: request.try_harder,
            try_invert: request.try_invert,
            try_rotate: request.try_rotate,
        });
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Decoder that blocks inside `decode` until released
pub struct BlockingDecoder {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
    calls: AtomicUsize,
}

impl BlockingDecoder {
    /// Returns the decoder, a receiver signalled on entry, and a sender releasing one call
    pub fn new() -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let decoder = Self {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            calls: AtomicUsize::new(0),
        };
        (decoder, entered_rx, release_tx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Decoder for BlockingDecoder {
    fn decode(
        &self,
        _image: &GrayImage,
        _request: &DecodeRequest<'_>,
    ) -> DecodeResult<Option<Decoded>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.entered.lock().unwrap().send(());
        self.release
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| DecodeError::Failed("released without signal".into()))?;
        Ok(Some(Decoded::new("slow", Symbology::Qr)))
    }
}

/// Decoder that panics on every call
pub struct PanickingDecoder;

impl Decoder for PanickingDecoder {
    fn decode(
        &self,
        _image: &GrayImage,
        _request: &DecodeRequest<'_>,
    ) -> DecodeResult<Option<Decoded>> {
        panic!("decoder exploded")
    }
}
