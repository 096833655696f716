use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Width and height of a pixel grid. Both are non-zero and their product
/// fits in `usize`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let invalid = || Error::InvalidDimensions {
            width: width as u64,
            height: height as u64,
        };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(invalid)?;
        Ok(Dimensions { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in a grayscale buffer of these dimensions.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WxH`, e.g. `32x32` or `1881X926`.
impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(&['x', 'X'][..])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
        let width = w.trim().parse().map_err(|err| format!("width: {}", err))?;
        let height = h.trim().parse().map_err(|err| format!("height: {}", err))?;
        Dimensions::new(width, height).map_err(|err| err.to_string())
    }
}

/// Single-channel 8-bit image stored row-major without padding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GrayImage {
    dims: Dimensions,
    data: Box<[u8]>,
}

impl GrayImage {
    /// Wraps `data` as a `dims`-sized grid. Fails with
    /// [`Error::SizeMismatch`] unless `data.len() == width * height`.
    pub fn from_raw(dims: Dimensions, data: impl Into<Box<[u8]>>) -> Result<Self> {
        let data = data.into();
        if data.len() != dims.pixel_count() {
            return Err(Error::SizeMismatch {
                expected: dims.pixel_count(),
                actual: data.len(),
            });
        }
        Ok(GrayImage { dims, data })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
