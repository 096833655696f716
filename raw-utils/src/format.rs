use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Picks the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| Error::UnsupportedFormat(ext.to_string()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Matches `path` against every extension this format is known by.
    pub fn matches(self, path: &Path) -> bool {
        Self::from_path(path).ok() == Some(self)
    }
}

impl FromStr for ImageFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            _ => Err("unexpected format"),
        }
    }
}

/// How grayscale bytes are laid out in a raw file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RawLayout {
    /// Bare pixel bytes; dimensions must be known out-of-band.
    Headerless,
    /// Pixel bytes behind a binary PGM (`P5`) header.
    Pgm,
}

impl RawLayout {
    pub fn extension(self) -> &'static str {
        match self {
            RawLayout::Headerless => "raw",
            RawLayout::Pgm => "pgm",
        }
    }
}
