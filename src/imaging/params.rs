//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the [`operations`](super::operations) module (which decides what each file
//! needs) and the [`backend`](super::backend) (which does the pixel work), so
//! the batch loop can be tested against a mock backend.
//!
//! ## Types
//!
//! - [`ImageKind`] — The six declared formats the normalizer handles.
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`EncodeOptions`] — Format-specific encoder settings.
//! - [`EncodePolicy`] — Whether to flatten to RGB, plus the encoder settings.
//! - [`ExifPolicy`] — Drop the EXIF block on save, or keep it with orientation reset.
//! - [`NormalizeParams`] — Full specification for normalizing one file in place.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Declared format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
}

/// Extensions the normalizer recognises, with the format each one declares.
const EXTENSIONS: &[(&str, ImageKind)] = &[
    ("jpg", ImageKind::Jpeg),
    ("jpeg", ImageKind::Jpeg),
    ("png", ImageKind::Png),
    ("bmp", ImageKind::Bmp),
    ("gif", ImageKind::Gif),
    ("tif", ImageKind::Tiff),
    ("tiff", ImageKind::Tiff),
    ("webp", ImageKind::WebP),
];

impl ImageKind {
    /// Look up a file extension, case-insensitively, without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
            .map(|(_, kind)| *kind)
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Tiff => Some(Self::Tiff),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// Whether the container can carry an EXIF block we know how to re-attach.
    pub fn carries_exif(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::WebP)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::WebP => "WEBP",
        };
        f.write_str(name)
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoder settings for one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOptions {
    Jpeg {
        quality: Quality,
        progressive: bool,
        optimize: bool,
    },
    /// Lossy WebP. `method` is libwebp's effort level, 0 (fast) to 6 (slowest, smallest).
    WebP { quality: Quality, method: u8 },
    /// Re-encode in the declared format with the encoder's defaults.
    Passthrough,
}

/// How a declared format is recompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodePolicy {
    /// Flatten to 8-bit RGB before encoding (drops alpha).
    pub convert_to_rgb: bool,
    pub options: EncodeOptions,
}

impl EncodePolicy {
    pub fn passthrough() -> Self {
        Self {
            convert_to_rgb: false,
            options: EncodeOptions::Passthrough,
        }
    }
}

/// What happens to the source EXIF block when the file is rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExifPolicy {
    /// Save without any EXIF. Viewers cannot re-rotate already-upright pixels.
    #[default]
    Strip,
    /// Keep the EXIF block with the orientation tag reset to 1.
    Preserve,
}

/// Parameters for normalizing a single file in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    pub path: PathBuf,
    pub kind: ImageKind,
    /// Both output dimensions are bounded by this many pixels.
    pub max_size: u32,
    pub policy: EncodePolicy,
    pub exif: ExifPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("WebP"), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_extension("Tiff"), Some(ImageKind::Tiff));
    }

    #[test]
    fn unknown_extensions_have_no_kind() {
        assert_eq!(ImageKind::from_extension("txt"), None);
        assert_eq!(ImageKind::from_extension("avif"), None);
        assert_eq!(ImageKind::from_extension(""), None);
    }

    #[test]
    fn image_format_mapping_is_symmetric() {
        for kind in [
            ImageKind::Jpeg,
            ImageKind::Png,
            ImageKind::Bmp,
            ImageKind::Gif,
            ImageKind::Tiff,
            ImageKind::WebP,
        ] {
            assert_eq!(ImageKind::from_image_format(kind.image_format()), Some(kind));
        }
        assert_eq!(ImageKind::from_image_format(ImageFormat::Avif), None);
    }

    #[test]
    fn only_jpeg_png_webp_carry_exif() {
        assert!(ImageKind::Jpeg.carries_exif());
        assert!(ImageKind::Png.carries_exif());
        assert!(ImageKind::WebP.carries_exif());
        assert!(!ImageKind::Bmp.carries_exif());
        assert!(!ImageKind::Gif.carries_exif());
        assert!(!ImageKind::Tiff.carries_exif());
    }

    #[test]
    fn display_uses_upper_case_names() {
        assert_eq!(ImageKind::Jpeg.to_string(), "JPEG");
        assert_eq!(ImageKind::WebP.to_string(), "WEBP");
    }

    #[test]
    fn exif_policy_defaults_to_strip() {
        assert_eq!(ExifPolicy::default(), ExifPolicy::Strip);
    }
}
