// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for scanner operations
//!
//! This module provides command-line functionality for:
//! - Scanning image files through a scan session
//! - Switching the torch

use barcode_scanner::backends::camera::FrameLoopController;
use barcode_scanner::backends::file_source::ImageFileSource;
use barcode_scanner::config::Options;
use barcode_scanner::errors::ConfigResult;
use barcode_scanner::flash::SysfsTorch;
use barcode_scanner::frame_processor::{
    ChannelSink, DelayedSink, EventSink, QrDecoder, ScannerEvent, SessionController,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// Option flags given on the command line
pub struct OptionOverrides {
    pub crop_percent: Option<f64>,
    pub qr_only: bool,
    pub try_harder: bool,
    pub no_invert: bool,
    pub no_rotate: bool,
}

/// Load options from `path` (or defaults) and apply command line flags
pub fn resolve_options(path: Option<&Path>, overrides: &OptionOverrides) -> ConfigResult<Options> {
    let mut options = match path {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };

    if let Some(crop_percent) = overrides.crop_percent {
        options.crop_percent = crop_percent;
    }
    options.restrict_to_qr_family |= overrides.qr_only;
    options.try_harder |= overrides.try_harder;
    if overrides.no_invert {
        options.try_invert = false;
    }
    if overrides.no_rotate {
        options.try_rotate = false;
    }

    options.validate()?;
    Ok(options)
}

/// Scan image files as consecutive frames and print every event
pub fn scan_files(
    files: Vec<PathBuf>,
    options: Options,
    rotation: i32,
    delayed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ScannerEvent>();

    let sink: Arc<dyn EventSink> = if delayed {
        Arc::new(DelayedSink::new(ChannelSink::new(tx), &options))
    } else {
        Arc::new(ChannelSink::new(tx))
    };

    // Print events as they arrive, in order
    let printer = runtime.spawn(async move {
        let mut results = 0usize;
        while let Some(event) = rx.recv().await {
            if matches!(event, ScannerEvent::ScanResult { .. }) {
                results += 1;
            }
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to serialize event: {}", e),
            }
        }
        results
    });

    let session = Arc::new(SessionController::new(Arc::new(QrDecoder::new()), sink));
    session.start(options)?;

    let source = ImageFileSource::new(files).with_rotation(rotation);
    let mut frame_loop = FrameLoopController::run_source("files", source, Arc::clone(&session));
    frame_loop.join();

    session.release();
    // Dropping the last session handle closes the event channel
    drop(session);

    let results = runtime.block_on(printer)?;
    eprintln!("{} code(s) found", results);
    Ok(())
}

/// Switch the torch through a scan session and report the transition
pub fn switch_torch(enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let torch = SysfsTorch::detect()?;
    if torch.devices().is_empty() {
        println!("No flash LEDs found.");
        return Ok(());
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ScannerEvent>();
    let sink = Arc::new(ChannelSink::new(tx));

    let session = Arc::new_cyclic(|weak: &Weak<SessionController>| {
        let weak = weak.clone();
        let torch = torch.with_observer(move |enabled| {
            if let Some(session) = weak.upgrade() {
                session.torch_state_changed(enabled);
            }
        });
        SessionController::new(Arc::new(QrDecoder::new()), sink).with_torch(Arc::new(torch))
    });

    session.set_torch_enabled(enabled);
    drop(session);

    let mut reported = false;
    while let Ok(event) = rx.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
        reported = true;
    }
    if !reported {
        println!("Torch already {}.", if enabled { "on" } else { "off" });
    }
    Ok(())
}
