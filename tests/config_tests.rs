// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for scanner options

use barcode_scanner::{ConfigError, Options, Symbology};
use std::time::Duration;

#[test]
fn test_options_default() {
    let options = Options::default();

    assert!((options.crop_percent - 0.8).abs() < f64::EPSILON);
    assert!(!options.try_harder);
    assert!(options.try_rotate);
    assert!(options.try_invert);
    assert!(!options.restrict_to_qr_family);
    assert_eq!(options.scan_delay(), Duration::from_millis(50));
    assert_eq!(options.scan_delay_success(), Duration::from_millis(1000));
    assert!(options.validate().is_ok());
}

#[test]
fn test_options_symbology_set() {
    let mut options = Options::default();
    assert_eq!(options.symbologies(), Symbology::ALL);

    options.restrict_to_qr_family = true;
    assert_eq!(options.symbologies(), &[Symbology::Qr, Symbology::MicroQr]);
}

#[test]
fn test_options_load_from_file() {
    let tmp = tempfile::TempDir::new().expect("create temp dir");
    let path = tmp.path().join("scanner.json");
    std::fs::write(
        &path,
        r#"{ "cropPercent": 0.6, "restrictToQrFamily": true, "scanDelaySuccessMs": 2500 }"#,
    )
    .unwrap();

    let options = Options::load(&path).unwrap();
    assert!((options.crop_percent - 0.6).abs() < f64::EPSILON);
    assert!(options.restrict_to_qr_family);
    assert_eq!(options.scan_delay_success(), Duration::from_millis(2500));
    // Unspecified fields keep their defaults
    assert!(options.try_invert);
    assert_eq!(options.scan_delay(), Duration::from_millis(50));
}

#[test]
fn test_options_load_rejects_bad_crop() {
    let tmp = tempfile::TempDir::new().expect("create temp dir");
    let path = tmp.path().join("scanner.json");
    std::fs::write(&path, r#"{ "cropPercent": 0 }"#).unwrap();

    assert!(matches!(
        Options::load(&path),
        Err(ConfigError::InvalidOptions(_))
    ));
}

#[test]
fn test_options_load_missing_file() {
    let result = Options::load(std::path::Path::new("/nonexistent/scanner.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_options_negative_delay_rejected() {
    let result = Options::from_json_str(r#"{ "scanDelayMs": -5 }"#);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
