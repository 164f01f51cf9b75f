// SPDX-License-Identifier: GPL-3.0-only

//! Scanner options
//!
//! [`Options`] is an immutable snapshot handed to a session at start.
//! Changing any field means reconfiguring the whole session.

use crate::constants::defaults;
use crate::errors::{ConfigError, ConfigResult};
use crate::frame_processor::types::Symbology;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Spend more time per frame looking for codes
    pub try_harder: bool,
    /// Also look for codes rotated relative to the sensor
    pub try_rotate: bool,
    /// Also look for light-on-dark codes
    pub try_invert: bool,
    /// Only decode QR and Micro QR codes
    pub restrict_to_qr_family: bool,
    /// Side of the square crop as a fraction of frame height, in `(0, 1]`
    pub crop_percent: f64,
    /// Hold-off after a reported scan error
    pub scan_delay_ms: u64,
    /// Hold-off after a reported successful scan
    pub scan_delay_success_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            try_harder: defaults::TRY_HARDER,
            try_rotate: defaults::TRY_ROTATE,
            try_invert: defaults::TRY_INVERT,
            restrict_to_qr_family: defaults::RESTRICT_TO_QR_FAMILY,
            crop_percent: defaults::CROP_PERCENT,
            scan_delay_ms: defaults::SCAN_DELAY_MS,
            scan_delay_success_ms: defaults::SCAN_DELAY_SUCCESS_MS,
        }
    }
}

impl Options {
    /// Check the options for values the pipeline cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.crop_percent.is_finite() || self.crop_percent <= 0.0 || self.crop_percent > 1.0 {
            return Err(ConfigError::InvalidOptions(format!(
                "crop percent must be in (0, 1], got {}",
                self.crop_percent
            )));
        }
        // Delays are unsigned, so only the crop needs a range check
        Ok(())
    }

    /// Parse options from a JSON string and validate them
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file and validate them
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Symbologies the decoder is allowed to report
    pub fn symbologies(&self) -> &'static [Symbology] {
        if self.restrict_to_qr_family {
            Symbology::QR_FAMILY
        } else {
            Symbology::ALL
        }
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }

    pub fn scan_delay_success(&self) -> Duration {
        Duration::from_millis(self.scan_delay_success_ms)
    }
}
