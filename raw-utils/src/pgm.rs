use std::convert::TryFrom;
use std::io::{self, Write};

use crate::{Dimensions, Error, GrayImage, Result};

const MAGIC: &[u8] = b"P5";

pub fn pgm_header(dims: Dimensions) -> String {
    format!("P5\n{} {}\n255\n", dims.width(), dims.height())
}

pub fn write_pgm<W: Write>(mut w: W, img: &GrayImage) -> io::Result<()> {
    w.write_all(pgm_header(img.dimensions()).as_bytes())?;
    w.write_all(img.as_bytes())
}

/// Splits a binary PGM into its dimensions and the pixel data offset.
pub(crate) fn parse_header(buf: &[u8]) -> Result<(Dimensions, usize)> {
    if !buf.starts_with(MAGIC) {
        return Err(Error::InvalidHeader("missing P5 magic"));
    }
    let mut pos = MAGIC.len();
    let width = next_number(buf, &mut pos)?;
    let height = next_number(buf, &mut pos)?;
    let maxval = next_number(buf, &mut pos)?;
    if maxval != 255 {
        return Err(Error::InvalidHeader("only 8-bit PGM is supported"));
    }
    // exactly one whitespace byte separates the header from the raster
    match buf.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => return Err(Error::InvalidHeader("truncated header")),
    }
    let width = u32::try_from(width).map_err(|_| Error::InvalidDimensions {
        width,
        height,
    })?;
    let height = u32::try_from(height).map_err(|_| Error::InvalidDimensions {
        width: width as u64,
        height,
    })?;
    Ok((Dimensions::new(width, height)?, pos))
}

fn next_number(buf: &[u8], pos: &mut usize) -> Result<u64> {
    loop {
        match buf.get(*pos) {
            Some(b'#') => {
                while let Some(&b) = buf.get(*pos) {
                    *pos += 1;
                    if b == b'\n' {
                        break;
                    }
                }
            }
            Some(b) if b.is_ascii_whitespace() => *pos += 1,
            Some(b) if b.is_ascii_digit() => break,
            Some(_) => return Err(Error::InvalidHeader("unexpected byte")),
            None => return Err(Error::InvalidHeader("truncated header")),
        }
    }
    let start = *pos;
    while buf.get(*pos).map_or(false, |b| b.is_ascii_digit()) {
        *pos += 1;
    }
    std::str::from_utf8(&buf[start..*pos])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::InvalidHeader("number out of range"))
}

/// Parses an in-memory binary PGM. The raster must hold exactly
/// `width * height` bytes.
pub fn parse_pgm(buf: &[u8]) -> Result<GrayImage> {
    let (dims, offset) = parse_header(buf)?;
    GrayImage::from_raw(dims, &buf[offset..])
}
