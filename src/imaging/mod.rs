//! Image processing for the normalizer.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image` format sniffing + GIF/WebP frame inspection |
//! | **Orient** | EXIF orientation via `image::metadata::Orientation` |
//! | **Shrink** | Lanczos3 `resize_exact` to a bounded size |
//! | **Recompress** | mozjpeg (JPEG), libwebp (WebP), `image` encoders (the rest) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Format policy table and the probe-then-normalize step
//! - **EXIF**: Orientation reset and re-attachment for the preserve policy

pub mod backend;
mod calculations;
mod exif;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Probe};
pub use calculations::calculate_bounded_dimensions;
pub use operations::{FileResult, NormalizeSettings, PolicyTable, normalize_file, plan_normalize};
pub use params::{EncodeOptions, EncodePolicy, ExifPolicy, ImageKind, NormalizeParams, Quality};
pub use rust_backend::RustBackend;
