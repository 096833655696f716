//! Conversion between headerless grayscale pixel buffers and PNG/JPEG
//! images.
//!
//! A raw buffer carries no dimensions, so every operation reading one takes
//! them explicitly as [`Dimensions`]. The [`RawLayout::Pgm`] layout prefixes
//! the same bytes with a binary PGM header for self-describing files.
mod error;
mod frame;
mod pgm;
pub mod conversions;
pub mod convert;
pub mod format;
pub mod load_frames;
pub mod save_frames;

pub use self::convert::{image_to_raw, raw_to_image};
pub use self::error::{Error, Result};
pub use self::format::{ImageFormat, RawLayout};
pub use self::frame::{Dimensions, GrayImage};
pub use self::pgm::{parse_pgm, pgm_header, write_pgm};

/// Quality used for every JPEG written by this crate.
pub const JPEG_QUALITY: u8 = 75;

pub const PBAR_TEMPLATE: &str = "\
    {wide_bar} {percent:>3}% {pos:>7}/{len} \
    Elapsed: {elapsed_precise} ETA: {eta_precise}\
";
