use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::conversions::{to_grayscale, PixelLayout};
use crate::pgm::parse_header;
use crate::{Dimensions, Error, GrayImage, ImageFormat, RawLayout, Result};

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::io(path, err))
}

/// Maps the whole file, or returns `None` for an empty one (which can't be
/// mapped).
fn map_file(file: &File) -> io::Result<Option<memmap::Mmap>> {
    if file.metadata()?.len() == 0 {
        return Ok(None);
    }
    unsafe { memmap::Mmap::map(file) }.map(Some)
}

/// Reads a headerless buffer of `dims` pixels. The file length is checked
/// before any pixel data is read.
pub fn load_raw(path: &Path, dims: Dimensions) -> Result<GrayImage> {
    let file = open(path)?;
    let len = file.metadata()?.len();
    let expected = dims.pixel_count();
    if len != expected as u64 {
        return Err(Error::SizeMismatch {
            expected,
            actual: len as usize,
        });
    }
    let data = match map_file(&file)? {
        Some(mmap) => mmap.to_vec(),
        None => Vec::new(),
    };
    debug!(path = %path.display(), %dims, "loaded raw buffer");
    GrayImage::from_raw(dims, data)
}

/// Reads a binary PGM file.
pub fn load_pgm(path: &Path) -> Result<GrayImage> {
    let file = open(path)?;
    let mmap = map_file(&file)?
        .ok_or(Error::InvalidHeader("missing P5 magic"))?;
    let (dims, offset) = parse_header(&mmap)?;
    let img = GrayImage::from_raw(dims, &mmap[offset..])?;
    debug!(path = %path.display(), %dims, "loaded PGM");
    Ok(img)
}

/// Reads a raw grayscale file in the given layout.
///
/// Headerless files need `dims`. For PGM files `dims` is optional and, when
/// given, must agree with the header.
pub fn load_raw_frame(
    path: &Path, layout: RawLayout, dims: Option<Dimensions>,
) -> Result<GrayImage> {
    match layout {
        RawLayout::Headerless => {
            load_raw(path, dims.ok_or(Error::MissingDimensions)?)
        }
        RawLayout::Pgm => {
            let img = load_pgm(path)?;
            match dims {
                Some(expected) if expected != img.dimensions() => {
                    Err(Error::DimensionMismatch {
                        expected,
                        actual: img.dimensions(),
                    })
                }
                _ => Ok(img),
            }
        }
    }
}

fn dims_of(width: u32, height: u32) -> Result<Dimensions> {
    Dimensions::new(width, height)
}

/// Decodes a PNG stream to grayscale. Palettes and sub-byte depths are
/// expanded first.
///
/// 16-bit samples keep their high byte, so `0x1234` becomes `0x12` and the
/// full 16-bit range maps onto 0..=255. Converters that clamp 16-bit values
/// to 255 instead (as PIL's `I;16` to `L` does) give different results for
/// such files.
pub fn decode_png<R: Read>(r: R) -> Result<GrayImage> {
    let mut decoder = png::Decoder::new(r);
    decoder.set_transformations(
        png::Transformations::EXPAND | png::Transformations::STRIP_16,
    );
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let layout = match info.color_type {
        png::ColorType::Grayscale => PixelLayout::Gray,
        png::ColorType::GrayscaleAlpha => PixelLayout::GrayAlpha,
        png::ColorType::Rgb => PixelLayout::Rgb,
        png::ColorType::Rgba => PixelLayout::Rgba,
        png::ColorType::Indexed => {
            return Err(Error::UnsupportedPixels("unexpanded PNG palette".into()))
        }
    };
    if info.bit_depth != png::BitDepth::Eight {
        return Err(Error::UnsupportedPixels(
            format!("PNG bit depth {:?}", info.bit_depth),
        ));
    }
    debug!(
        width = info.width, height = info.height, color = ?info.color_type,
        "decoded PNG"
    );
    GrayImage::from_raw(
        dims_of(info.width, info.height)?,
        gray_rows(&buf, info.line_size, info.width as usize, layout),
    )
}

/// Strips any per-row padding before converting to grayscale.
fn gray_rows(buf: &[u8], line_size: usize, width: usize, layout: PixelLayout) -> Vec<u8> {
    let row_bytes = width * layout.channels();
    if line_size == row_bytes {
        return to_grayscale(buf, layout);
    }
    buf.chunks(line_size)
        .flat_map(|row| to_grayscale(&row[..row_bytes.min(row.len())], layout))
        .collect()
}

/// Decodes a baseline or progressive JPEG stream to grayscale.
pub fn decode_jpeg<R: Read>(r: R) -> Result<GrayImage> {
    let mut decoder = jpeg_decoder::Decoder::new(r);
    let pixels = decoder.decode()?;
    let info = decoder
        .info()
        .ok_or_else(|| Error::UnsupportedPixels("missing JPEG frame info".into()))?;

    let gray = match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => pixels,
        // big-endian samples, keep the high byte
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .map(|p| p[0])
            .collect(),
        jpeg_decoder::PixelFormat::RGB24 => to_grayscale(&pixels, PixelLayout::Rgb),
        jpeg_decoder::PixelFormat::CMYK32 => to_grayscale(&pixels, PixelLayout::Cmyk),
        #[allow(unreachable_patterns)]
        other => {
            return Err(Error::UnsupportedPixels(format!("JPEG {:?}", other)))
        }
    };
    debug!(
        width = info.width, height = info.height, format = ?info.pixel_format,
        "decoded JPEG"
    );
    GrayImage::from_raw(dims_of(info.width.into(), info.height.into())?, gray)
}

pub fn decode_image<R: Read>(r: R, format: ImageFormat) -> Result<GrayImage> {
    match format {
        ImageFormat::Png => decode_png(r),
        ImageFormat::Jpeg => decode_jpeg(r),
    }
}

/// Opens an image file, picking the decoder from its extension, and reduces
/// it to grayscale.
pub fn load_image(path: &Path) -> Result<GrayImage> {
    let format = ImageFormat::from_path(path)?;
    let file = open(path)?;
    decode_image(BufReader::new(file), format)
}
