//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the batch loop needs:
//! `probe` (classify a file without touching it) and `normalize` (re-orient,
//! shrink, recompress and overwrite it).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::{ImageKind, NormalizeParams};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode {kind}: {message}")]
    Encode { kind: ImageKind, message: String },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of a probe: what the file is, and whether it may be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub kind: ImageKind,
    /// More than one frame (animated GIF or WebP).
    pub animated: bool,
}

/// Trait for image processing backends.
///
/// The batch loop only talks to this trait, so its filtering, skipping and
/// error isolation can be tested without decoding a single pixel.
pub trait ImageBackend {
    /// Detect the declared format and whether the image is animated.
    fn probe(&self, path: &Path) -> Result<Probe, BackendError>;

    /// Rewrite the file in place. Returns the saved dimensions.
    fn normalize(&self, params: &NormalizeParams) -> Result<Dimensions, BackendError>;
}
