//! # imgnorm
//!
//! Shrinks, re-orients and recompresses every image in a directory, in place.
//!
//! For each file whose extension is one of `jpg jpeg png bmp gif tiff webp`:
//!
//! ```text
//! open → skip if animated → apply EXIF orientation → shrink to ≤ 1000px
//!      → flatten to RGB (JPEG/WebP) → re-encode in the same format → replace
//! ```
//!
//! Files are processed one at a time. A file that fails is reported and left
//! as it was; the batch carries on.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Directory listing, the per-file loop, [`batch::Outcome`] and [`batch::Report`] |
//! | [`imaging`] | Backend trait, pure-Rust backend, dimension math, format policy table, EXIF handling |
//! | [`config`] | `imgnorm.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Upright Pixels, No Orientation Tag
//!
//! Orientation is baked into the pixels and the saved file carries no EXIF by
//! default. A file that still carried `Orientation = 6` next to already-rotated
//! pixels would be rotated twice by any viewer that honours the tag. The
//! `exif = "preserve"` option keeps the rest of the EXIF block with the tag
//! reset to 1.
//!
//! ## Encode First, Then Replace
//!
//! The new file is fully encoded in memory and written through a temp file in
//! the same directory that is renamed over the original. A decode or encode
//! error leaves the original bytes untouched.
//!
//! ## Format Policy Table
//!
//! Per-format behaviour lives in one lookup, [`imaging::PolicyTable`]: JPEG
//! and WebP are flattened to RGB and recompressed at quality 90 (JPEG
//! progressive with optimized Huffman tables, WebP at method 6); PNG, BMP, GIF
//! and TIFF are re-encoded as they are.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
