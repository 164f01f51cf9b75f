// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner core

use std::fmt;

/// Result type alias using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias using DecodeError
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Configuration errors
///
/// Returned synchronously from `start`/`reconfigure` and from option loading.
/// A failed call never changes the state of an existing session.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Options failed validation (e.g. crop percent outside `(0, 1]`)
    InvalidOptions(String),
    /// Options file could not be read
    Io(String),
    /// Options file is not valid JSON for [`crate::config::Options`]
    Parse(String),
}

/// Per-frame decode errors
///
/// Never fatal to a session: the pipeline converts these into
/// `on_scan_error` events and moves on to the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The decoder reported a failure
    Failed(String),
    /// The decoder panicked while processing the frame
    Panicked(String),
}

/// Errors materializing pixel data from a camera frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero
    EmptyDimensions,
    /// Buffer is shorter than width/height/stride imply
    BufferTooSmall { expected: usize, actual: usize },
    /// Row stride is smaller than one row of pixels
    InvalidStride { stride: u32, min: u64 },
    /// Crop rectangle is empty or exceeds the frame
    CropOutOfBounds,
}

/// Torch (flash LED) control errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorchError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidOptions(msg) => write!(f, "Invalid options: {}", msg),
            ConfigError::Io(msg) => write!(f, "Failed to read options: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse options: {}", msg),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Failed(msg) => write!(f, "Decode failed: {}", msg),
            DecodeError::Panicked(msg) => write!(f, "Decoder panicked: {}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::EmptyDimensions => write!(f, "Frame has zero width or height"),
            FrameError::BufferTooSmall { expected, actual } => write!(
                f,
                "Frame buffer too small: expected {} bytes, got {}",
                expected, actual
            ),
            FrameError::InvalidStride { stride, min } => {
                write!(f, "Invalid stride {} (minimum {})", stride, min)
            }
            FrameError::CropOutOfBounds => write!(f, "Crop rectangle outside frame bounds"),
        }
    }
}

impl fmt::Display for TorchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Torch error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for FrameError {}
impl std::error::Error for TorchError {}

// A frame whose pixels cannot be read is reported like any other decode failure
impl From<FrameError> for DecodeError {
    fn from(err: FrameError) -> Self {
        DecodeError::Failed(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for TorchError {
    fn from(err: std::io::Error) -> Self {
        TorchError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_converts_to_decode_error() {
        let err: DecodeError = FrameError::BufferTooSmall {
            expected: 16,
            actual: 8,
        }
        .into();
        match err {
            DecodeError::Failed(msg) => assert!(msg.contains("expected 16 bytes")),
            _ => panic!("Expected Failed variant"),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidOptions("crop percent must be in (0, 1]".into());
        assert_eq!(
            err.to_string(),
            "Invalid options: crop percent must be in (0, 1]"
        );
    }
}
