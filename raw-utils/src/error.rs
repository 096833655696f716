use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::{fmt, io};

use crate::frame::Dimensions;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Input file (or the directory an output should land in) is missing.
    NotFound(PathBuf),
    Io(io::Error),
    PngDecode(png::DecodingError),
    JpegDecode(jpeg_decoder::Error),
    /// Decoder produced a pixel layout we can't reduce to grayscale.
    UnsupportedPixels(String),
    PngEncode(png::EncodingError),
    JpegEncode(jpeg_encoder::EncodingError),
    /// File extension does not name a supported image format.
    UnsupportedFormat(String),
    SizeMismatch { expected: usize, actual: usize },
    DimensionMismatch { expected: Dimensions, actual: Dimensions },
    InvalidDimensions { width: u64, height: u64 },
    /// Headerless input read without dimensions.
    MissingDimensions,
    InvalidHeader(&'static str),
}

impl Error {
    /// Wraps an I/O error, turning `NotFound` into an error naming `path`.
    pub(crate) fn io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(err),
        }
    }

    /// True for errors caused by unreadable or truncated image data rather
    /// than missing files or caller mistakes.
    pub fn is_decode(&self) -> bool {
        match self {
            Error::PngDecode(_) | Error::JpegDecode(_) => true,
            Error::UnsupportedPixels(_) | Error::InvalidHeader(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Error::Io(e) => write!(f, "{}", e),
            Error::PngDecode(e) => write!(f, "failed to decode PNG: {}", e),
            Error::JpegDecode(e) => write!(f, "failed to decode JPEG: {}", e),
            Error::UnsupportedPixels(msg) => write!(f, "unsupported pixel format: {}", msg),
            Error::PngEncode(e) => write!(f, "failed to encode PNG: {}", e),
            Error::JpegEncode(e) => write!(f, "failed to encode JPEG: {}", e),
            Error::UnsupportedFormat(ext) => {
                write!(f, "unsupported image format: {:?}", ext)
            }
            Error::SizeMismatch { expected, actual } => write!(
                f,
                "buffer size mismatch: expected {} bytes, got {}",
                expected, actual,
            ),
            Error::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}, got {}",
                expected, actual,
            ),
            Error::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {}x{}", width, height)
            }
            Error::MissingDimensions => {
                write!(f, "headerless raw input requires explicit dimensions")
            }
            Error::InvalidHeader(msg) => write!(f, "invalid PGM header: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::PngDecode(e) => Some(e),
            Error::JpegDecode(e) => Some(e),
            Error::PngEncode(e) => Some(e),
            Error::JpegEncode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<png::DecodingError> for Error {
    fn from(e: png::DecodingError) -> Self {
        Error::PngDecode(e)
    }
}

impl From<jpeg_decoder::Error> for Error {
    fn from(e: jpeg_decoder::Error) -> Self {
        Error::JpegDecode(e)
    }
}

impl From<png::EncodingError> for Error {
    fn from(e: png::EncodingError) -> Self {
        Error::PngEncode(e)
    }
}

impl From<jpeg_encoder::EncodingError> for Error {
    fn from(e: jpeg_encoder::EncodingError) -> Self {
        Error::JpegEncode(e)
    }
}
