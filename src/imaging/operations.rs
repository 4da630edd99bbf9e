//! High-level image operations.
//!
//! These functions combine the format policy table with backend execution.
//! They take settings, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeOptions, EncodePolicy, ExifPolicy, ImageKind, NormalizeParams, Quality};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Recompression settings per declared format.
///
/// JPEG and WebP are flattened to RGB and re-encoded lossily; every other
/// format is re-encoded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyTable {
    jpeg: EncodePolicy,
    webp: EncodePolicy,
}

impl PolicyTable {
    pub fn new(jpeg_quality: Quality, webp_quality: Quality, webp_method: u8) -> Self {
        Self {
            jpeg: EncodePolicy {
                convert_to_rgb: true,
                options: EncodeOptions::Jpeg {
                    quality: jpeg_quality,
                    progressive: true,
                    optimize: true,
                },
            },
            webp: EncodePolicy {
                convert_to_rgb: true,
                options: EncodeOptions::WebP {
                    quality: webp_quality,
                    method: webp_method.min(6),
                },
            },
        }
    }

    /// Override the JPEG scan layout and Huffman table optimization.
    pub fn with_jpeg_modes(mut self, progressive: bool, optimize: bool) -> Self {
        if let EncodeOptions::Jpeg { quality, .. } = self.jpeg.options {
            self.jpeg.options = EncodeOptions::Jpeg {
                quality,
                progressive,
                optimize,
            };
        }
        self
    }

    pub fn lookup(&self, kind: ImageKind) -> EncodePolicy {
        match kind {
            ImageKind::Jpeg => self.jpeg,
            ImageKind::WebP => self.webp,
            ImageKind::Png | ImageKind::Bmp | ImageKind::Gif | ImageKind::Tiff => {
                EncodePolicy::passthrough()
            }
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new(Quality::default(), Quality::default(), 6)
    }
}

/// Everything the normalizer needs to know besides the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeSettings {
    pub max_size: u32,
    pub policies: PolicyTable,
    pub exif: ExifPolicy,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            max_size: 1000,
            policies: PolicyTable::default(),
            exif: ExifPolicy::Strip,
        }
    }
}

/// What happened to one image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileResult {
    Saved(Dimensions),
    /// Left untouched because it has more than one frame.
    Animated,
}

/// Plan a normalize operation without executing it.
pub fn plan_normalize(path: &Path, kind: ImageKind, settings: &NormalizeSettings) -> NormalizeParams {
    NormalizeParams {
        path: path.to_path_buf(),
        kind,
        max_size: settings.max_size,
        policy: settings.policies.lookup(kind),
        exif: settings.exif,
    }
}

/// Probe a file and, unless it is animated, rewrite it in place.
pub fn normalize_file(
    backend: &impl ImageBackend,
    path: &Path,
    settings: &NormalizeSettings,
) -> Result<FileResult> {
    let probe = backend.probe(path)?;
    if probe.animated {
        log::debug!("{}: {} is animated, leaving it alone", path.display(), probe.kind);
        return Ok(FileResult::Animated);
    }

    let params = plan_normalize(path, probe.kind, settings);
    let dims = backend.normalize(&params)?;
    Ok(FileResult::Saved(dims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn jpeg_policy_flattens_and_compresses() {
        let policy = PolicyTable::default().lookup(ImageKind::Jpeg);
        assert!(policy.convert_to_rgb);
        assert_eq!(
            policy.options,
            EncodeOptions::Jpeg {
                quality: Quality::new(90),
                progressive: true,
                optimize: true,
            }
        );
    }

    #[test]
    fn webp_policy_uses_max_effort() {
        let policy = PolicyTable::default().lookup(ImageKind::WebP);
        assert!(policy.convert_to_rgb);
        assert_eq!(
            policy.options,
            EncodeOptions::WebP {
                quality: Quality::new(90),
                method: 6,
            }
        );
    }

    #[test]
    fn lossless_formats_pass_through() {
        let table = PolicyTable::default();
        for kind in [ImageKind::Png, ImageKind::Bmp, ImageKind::Gif, ImageKind::Tiff] {
            assert_eq!(table.lookup(kind), EncodePolicy::passthrough(), "{kind}");
        }
    }

    #[test]
    fn jpeg_modes_can_be_turned_off() {
        let policy = PolicyTable::new(Quality::new(80), Quality::new(70), 4)
            .with_jpeg_modes(false, false)
            .lookup(ImageKind::Jpeg);
        assert_eq!(
            policy.options,
            EncodeOptions::Jpeg {
                quality: Quality::new(80),
                progressive: false,
                optimize: false,
            }
        );
        assert!(policy.convert_to_rgb);
    }

    #[test]
    fn webp_method_is_capped() {
        let policy = PolicyTable::new(Quality::new(80), Quality::new(70), 9).lookup(ImageKind::WebP);
        assert_eq!(
            policy.options,
            EncodeOptions::WebP {
                quality: Quality::new(70),
                method: 6,
            }
        );
    }

    #[test]
    fn plan_normalize_carries_settings() {
        let settings = NormalizeSettings {
            max_size: 640,
            exif: ExifPolicy::Preserve,
            ..Default::default()
        };
        let params = plan_normalize(Path::new("/photos/a.webp"), ImageKind::WebP, &settings);

        assert_eq!(params.path, Path::new("/photos/a.webp"));
        assert_eq!(params.kind, ImageKind::WebP);
        assert_eq!(params.max_size, 640);
        assert_eq!(params.exif, ExifPolicy::Preserve);
        assert_eq!(params.policy, settings.policies.lookup(ImageKind::WebP));
    }

    #[test]
    fn normalize_file_saves_still_image() {
        let backend = MockBackend::new().with_image("a.jpg", ImageKind::Jpeg, (1000, 750));

        let result =
            normalize_file(&backend, Path::new("/x/a.jpg"), &NormalizeSettings::default()).unwrap();

        assert_eq!(
            result,
            FileResult::Saved(Dimensions {
                width: 1000,
                height: 750
            })
        );
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Normalize {
                kind: ImageKind::Jpeg,
                max_size: 1000,
                exif: ExifPolicy::Strip,
                ..
            }
        ));
    }

    #[test]
    fn normalize_file_skips_animation_without_writing() {
        let backend = MockBackend::new().with_animation("spin.gif", ImageKind::Gif);

        let result =
            normalize_file(&backend, Path::new("/x/spin.gif"), &NormalizeSettings::default())
                .unwrap();

        assert_eq!(result, FileResult::Animated);
        assert!(backend.normalized_names().is_empty());
    }

    #[test]
    fn normalize_file_propagates_encode_failure() {
        let backend = MockBackend::new().with_broken_encode("bad.webp", ImageKind::WebP);

        let err = normalize_file(&backend, Path::new("/x/bad.webp"), &NormalizeSettings::default())
            .unwrap_err();

        assert!(matches!(
            err,
            BackendError::Encode {
                kind: ImageKind::WebP,
                ..
            }
        ));
    }
}
