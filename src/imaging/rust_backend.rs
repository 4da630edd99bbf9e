//! Pure Rust image processing backend (plus libwebp/mozjpeg for lossy encoding).
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` |
//! | Animation check | frame count via `AnimationDecoder` (GIF, APNG, WebP), IFD chain via `tiff` (TIFF) |
//! | Decode + orientation | `ImageDecoder::exif_metadata` / `orientation`, `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `mozjpeg` (progressive, optimized Huffman tables) |
//! | Encode WebP | `webp` (lossy, configurable method) |
//! | Encode PNG/BMP/GIF/TIFF | `image` built-in encoders |
//! | EXIF re-attach | `img-parts` (see [`exif`](super::exif)) |
//! | In-place replace | `tempfile::NamedTempFile::persist` |

use super::backend::{BackendError, Dimensions, ImageBackend, Probe};
use super::calculations::calculate_bounded_dimensions;
use super::exif::{attach_exif, exif_to_keep};
use super::params::{EncodeOptions, ImageKind, NormalizeParams};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::error::{DecodingError, ImageError};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Cursor, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a file and sniff its format from the magic bytes, falling back to the extension.
fn open_reader(path: &Path) -> Result<(ImageReader<BufReader<File>>, ImageKind), BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let kind = reader
        .format()
        .and_then(ImageKind::from_image_format)
        .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;
    Ok((reader, kind))
}

/// Whether the file holds more than one frame (GIF, APNG, WebP) or page (TIFF).
///
/// Only the frame count matters: an animation container with a single frame
/// is a still image.
fn has_multiple_frames(kind: ImageKind, reader: BufReader<File>) -> Result<bool, BackendError> {
    match kind {
        ImageKind::Gif => {
            let decoder = GifDecoder::new(reader).map_err(BackendError::Decode)?;
            Ok(decoder.into_frames().take(2).count() > 1)
        }
        ImageKind::Png => {
            let decoder = PngDecoder::new(reader).map_err(BackendError::Decode)?;
            if !decoder.is_apng().map_err(BackendError::Decode)? {
                return Ok(false);
            }
            let frames = decoder.apng().map_err(BackendError::Decode)?.into_frames();
            Ok(frames.take(2).count() > 1)
        }
        ImageKind::WebP => {
            let decoder = WebPDecoder::new(reader).map_err(BackendError::Decode)?;
            if !decoder.has_animation() {
                return Ok(false);
            }
            Ok(decoder.into_frames().take(2).count() > 1)
        }
        ImageKind::Tiff => {
            let decoder = tiff::decoder::Decoder::new(reader).map_err(tiff_error)?;
            Ok(decoder.more_images())
        }
        ImageKind::Jpeg | ImageKind::Bmp => Ok(false),
    }
}

fn tiff_error(err: tiff::TiffError) -> BackendError {
    BackendError::Decode(ImageError::Decoding(DecodingError::new(
        ImageFormat::Tiff.into(),
        err,
    )))
}

/// A decoded image with its pixels already in viewing orientation.
struct Upright {
    image: DynamicImage,
    exif: Option<Vec<u8>>,
}

/// Decode an image and apply its EXIF orientation to the pixel data.
fn load_upright(path: &Path) -> Result<Upright, BackendError> {
    let (reader, _) = open_reader(path)?;
    let mut decoder = reader.into_decoder().map_err(BackendError::Decode)?;

    let exif = decoder.exif_metadata().map_err(BackendError::Decode)?;
    // TIFF keeps orientation in its own IFD rather than an EXIF chunk, so ask the decoder.
    let orientation = match exif.as_deref().and_then(Orientation::from_exif_chunk) {
        Some(orientation) => orientation,
        None => decoder.orientation().map_err(BackendError::Decode)?,
    };

    let mut image = DynamicImage::from_decoder(decoder).map_err(BackendError::Decode)?;
    if orientation != Orientation::NoTransforms {
        log::debug!("{}: applying orientation {orientation:?}", path.display());
        image.apply_orientation(orientation);
    }
    Ok(Upright { image, exif })
}

/// Encode with the declared format's policy. Nothing is written to disk here.
fn encode(image: &DynamicImage, kind: ImageKind, options: EncodeOptions) -> Result<Vec<u8>, BackendError> {
    match options {
        EncodeOptions::Jpeg {
            quality,
            progressive,
            optimize,
        } => encode_jpeg(image, quality.value(), progressive, optimize),
        EncodeOptions::WebP { quality, method } => encode_webp(image, quality.value(), method),
        EncodeOptions::Passthrough => {
            let mut buf = Cursor::new(Vec::new());
            image
                .write_to(&mut buf, kind.image_format())
                .map_err(|e| BackendError::Encode {
                    kind,
                    message: e.to_string(),
                })?;
            Ok(buf.into_inner())
        }
    }
}

/// Encode as JPEG with mozjpeg.
///
/// mozjpeg's default profile already writes progressive scans; a baseline
/// stream needs the fastest profile, which also turns trellis quantization off.
///
/// mozjpeg reports libjpeg errors by panicking, so the whole encode runs under
/// `catch_unwind` and a panic becomes an ordinary per-file error.
fn encode_jpeg(
    image: &DynamicImage,
    quality: u32,
    progressive: bool,
    optimize: bool,
) -> Result<Vec<u8>, BackendError> {
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let pixels = rgb.into_raw();

    let encoded = std::panic::catch_unwind(|| -> std::io::Result<Vec<u8>> {
        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        if !progressive {
            comp.set_fastest_defaults();
        }
        comp.set_size(width, height);
        comp.set_quality(quality as f32);
        if progressive {
            comp.set_progressive_mode();
        }
        comp.set_optimize_coding(optimize);

        let mut started = comp.start_compress(Vec::new())?;
        started.write_scanlines(&pixels)?;
        started.finish()
    });

    match encoded {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(BackendError::Encode {
            kind: ImageKind::Jpeg,
            message: e.to_string(),
        }),
        Err(_) => Err(BackendError::Encode {
            kind: ImageKind::Jpeg,
            message: "mozjpeg aborted".to_string(),
        }),
    }
}

/// Encode as lossy WebP with libwebp.
fn encode_webp(image: &DynamicImage, quality: u32, method: u8) -> Result<Vec<u8>, BackendError> {
    let rgb = image.to_rgb8();
    let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());

    let mut config = webp::WebPConfig::new().map_err(|_| BackendError::Encode {
        kind: ImageKind::WebP,
        message: "libwebp rejected the default config".to_string(),
    })?;
    config.lossless = 0;
    config.quality = quality as f32;
    config.method = i32::from(method);

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::Encode {
            kind: ImageKind::WebP,
            message: format!("{e:?}"),
        })?;
    Ok(memory.to_vec())
}

/// Replace `path` with `bytes` via a sibling temp file and an atomic rename.
///
/// The original file's permissions are carried over to the replacement.
fn write_in_place(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let permissions = std::fs::metadata(path)?.permissions();

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    std::fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn probe(&self, path: &Path) -> Result<Probe, BackendError> {
        let (reader, kind) = open_reader(path)?;
        let animated = has_multiple_frames(kind, reader.into_inner())?;
        log::debug!("{}: detected {kind}, animated={animated}", path.display());
        Ok(Probe { kind, animated })
    }

    fn normalize(&self, params: &NormalizeParams) -> Result<Dimensions, BackendError> {
        let Upright { mut image, exif } = load_upright(&params.path)?;

        if let Some((width, height)) =
            calculate_bounded_dimensions((image.width(), image.height()), params.max_size)
        {
            log::debug!(
                "{}: resizing {}x{} -> {width}x{height}",
                params.path.display(),
                image.width(),
                image.height()
            );
            image = image.resize_exact(width, height, FilterType::Lanczos3);
        }

        if params.policy.convert_to_rgb {
            image = DynamicImage::ImageRgb8(image.to_rgb8());
        }

        let mut bytes = encode(&image, params.kind, params.policy.options)?;
        if let Some(chunk) = exif_to_keep(exif, params.kind, params.exif) {
            bytes = attach_exif(bytes, params.kind, chunk)?;
        }

        write_in_place(&params.path, &bytes)?;
        log::debug!("{}: wrote {} bytes", params.path.display(), bytes.len());

        Ok(Dimensions {
            width: image.width(),
            height: image.height(),
        })
    }
}
