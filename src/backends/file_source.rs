// SPDX-License-Identifier: GPL-3.0-only

//! Still image frame source
//!
//! Feeds image files through the scanner as if they were camera frames.
//! Useful for the command line and for reproducing scans offline.

use crate::backends::camera::FrameSource;
use crate::backends::camera::types::{Frame, PixelFormat};
use crate::constants::file_formats;
use crate::errors::FrameError;
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Errors loading an image file as a frame
#[derive(Debug)]
pub enum FileSourceError {
    /// Extension is not a supported image format
    Unsupported(String),
    /// Image could not be opened or decoded
    Image(image::ImageError),
    /// Decoded image does not form a valid frame
    Frame(FrameError),
}

impl fmt::Display for FileSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSourceError::Unsupported(ext) => write!(f, "Unsupported file format: {}", ext),
            FileSourceError::Image(e) => write!(f, "Failed to load image: {}", e),
            FileSourceError::Frame(e) => write!(f, "Invalid frame: {}", e),
        }
    }
}

impl std::error::Error for FileSourceError {}

impl From<image::ImageError> for FileSourceError {
    fn from(err: image::ImageError) -> Self {
        FileSourceError::Image(err)
    }
}

impl From<FrameError> for FileSourceError {
    fn from(err: FrameError) -> Self {
        FileSourceError::Frame(err)
    }
}

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> Result<Frame, FileSourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(FileSourceError::Unsupported(extension));
    }

    info!(path = %path.display(), "Loading image file");

    let rgba = image::open(path)?.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    debug!(width, height, "Image loaded successfully");

    Ok(Frame::new(rgba.into_raw(), width, height, PixelFormat::Rgba8)?)
}

/// Frame source yielding one frame per image file
///
/// Files that fail to load are skipped with a warning; from the pipeline's
/// point of view a broken source is just one that produces fewer frames.
pub struct ImageFileSource {
    paths: VecDeque<PathBuf>,
    rotation_degrees: i32,
}

impl ImageFileSource {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            rotation_degrees: 0,
        }
    }

    /// Report every frame with this sensor rotation
    pub fn with_rotation(mut self, rotation_degrees: i32) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Option<Frame> {
        while let Some(path) = self.paths.pop_front() {
            match load_image_as_frame(&path) {
                Ok(frame) => return Some(frame.with_rotation(self.rotation_degrees)),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping image"),
            }
        }
        None
    }
}
