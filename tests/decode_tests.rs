// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end decoding of image files through a scan session

mod common;

use barcode_scanner::backends::camera::FrameLoopController;
use barcode_scanner::backends::file_source::{ImageFileSource, load_image_as_frame};
use barcode_scanner::frame_processor::QrDecoder;
use barcode_scanner::{Options, SessionController, Symbology};
use common::{RecordingSink, render_qr};
use std::sync::Arc;
use tempfile::TempDir;

fn qr_session(options: Options) -> (Arc<SessionController>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let session = Arc::new(SessionController::new(
        Arc::new(QrDecoder::new()),
        sink.clone(),
    ));
    session.start(options).unwrap();
    (session, sink)
}

#[test]
fn test_image_files_decoded_through_frame_loop() {
    let tmp = TempDir::new().expect("create temp dir");
    let first = tmp.path().join("ticket.png");
    let second = tmp.path().join("blank.png");
    render_qr("https://example.com/ticket/42", 8)
        .save(&first)
        .unwrap();
    image::GrayImage::from_pixel(264, 264, image::Luma([255]))
        .save(&second)
        .unwrap();

    let (session, sink) = qr_session(Options {
        crop_percent: 1.0,
        ..Options::default()
    });
    let source = ImageFileSource::new(vec![first, second]);
    let mut frame_loop = FrameLoopController::run_source("files", source, Arc::clone(&session));
    frame_loop.join();

    assert_eq!(
        sink.scan_results(),
        vec![("https://example.com/ticket/42".to_string(), Symbology::Qr)]
    );
    assert!(sink.scan_errors().is_empty());
}

#[test]
fn test_qr_only_session_decodes_loaded_frame() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("code.png");
    render_qr("QR-FAMILY", 8).save(&path).unwrap();

    let (session, sink) = qr_session(Options {
        crop_percent: 1.0,
        restrict_to_qr_family: true,
        ..Options::default()
    });
    let frame = load_image_as_frame(&path).unwrap();
    assert!(session.submit_frame(&frame).is_processed());

    assert_eq!(
        sink.scan_results(),
        vec![("QR-FAMILY".to_string(), Symbology::Qr)]
    );
}
