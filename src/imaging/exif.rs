//! EXIF handling for rewritten files.
//!
//! Pixels are always transposed to their upright orientation before saving, so
//! the saved file must never tell a viewer to rotate them again. Two ways to get
//! there, picked by [`ExifPolicy`]:
//!
//! - **Strip**: the encoders never write EXIF, so nothing is attached.
//! - **Preserve**: the source block is kept with its orientation tag rewritten
//!   to 1 (normal) and spliced into the encoded bytes with `img-parts`.
//!
//! The EXIF chunk handled here is the raw TIFF structure (starting with `II*\0`
//! or `MM\0*`), which is what `image` decoders return and what `img-parts`
//! expects.

use super::backend::BackendError;
use super::params::{ExifPolicy, ImageKind};
use image::metadata::Orientation;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};

/// Decide which EXIF block, if any, goes into the saved file.
pub fn exif_to_keep(
    source: Option<Vec<u8>>,
    kind: ImageKind,
    policy: ExifPolicy,
) -> Option<Vec<u8>> {
    if policy == ExifPolicy::Strip || !kind.carries_exif() {
        return None;
    }
    let mut chunk = source?;
    if let Some(previous) = Orientation::remove_from_exif_chunk(&mut chunk) {
        log::debug!("reset EXIF orientation {previous:?} to normal");
    }
    Some(chunk)
}

/// Splice `exif` into already-encoded image bytes.
pub fn attach_exif(encoded: Vec<u8>, kind: ImageKind, exif: Vec<u8>) -> Result<Vec<u8>, BackendError> {
    let data = Bytes::from(encoded);
    let exif = Some(Bytes::from(exif));
    let container_err =
        |e: img_parts::Error| BackendError::ProcessingFailed(format!("Failed to attach EXIF: {e}"));

    let bytes = match kind {
        ImageKind::Jpeg => {
            let mut jpeg = Jpeg::from_bytes(data).map_err(container_err)?;
            jpeg.set_exif(exif);
            jpeg.encoder().bytes()
        }
        ImageKind::Png => {
            let mut png = Png::from_bytes(data).map_err(container_err)?;
            png.set_exif(exif);
            png.encoder().bytes()
        }
        ImageKind::WebP => {
            let mut webp = WebP::from_bytes(data).map_err(container_err)?;
            webp.set_exif(exif);
            webp.encoder().bytes()
        }
        other => {
            return Err(BackendError::ProcessingFailed(format!(
                "{other} cannot carry an EXIF block"
            )));
        }
    };
    Ok(bytes.to_vec())
}
