// SPDX-License-Identifier: GPL-3.0-only

//! Scanner-wide constants

/// Default scanner option values
pub mod defaults {
    /// Fraction of the frame height used as the square crop side
    pub const CROP_PERCENT: f64 = 0.8;
    /// Hold-off after a reported scan error (milliseconds)
    pub const SCAN_DELAY_MS: u64 = 50;
    /// Hold-off after a reported successful scan (milliseconds)
    pub const SCAN_DELAY_SUCCESS_MS: u64 = 1000;
    pub const TRY_HARDER: bool = false;
    pub const TRY_ROTATE: bool = true;
    pub const TRY_INVERT: bool = true;
    pub const RESTRICT_TO_QR_FAMILY: bool = false;
}

/// Image preparation constants
pub mod prepare {
    /// Percentile (0-100) of dark pixels clipped by contrast stretching
    pub const STRETCH_LOW_PERCENTILE: usize = 2;
    /// Percentile (0-100) of bright pixels clipped by contrast stretching
    pub const STRETCH_HIGH_PERCENTILE: usize = 98;
}

/// Supported still image formats for the file frame source
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tiff"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Sysfs flash LED locations
pub mod torch {
    /// Directory scanned for flash LEDs
    pub const LEDS_DIR: &str = "/sys/class/leds";
    /// Suffix identifying flash LED entries (e.g. `white:flash`)
    pub const FLASH_SUFFIX: &str = ":flash";
}
