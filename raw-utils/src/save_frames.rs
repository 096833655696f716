use std::convert::TryFrom;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::pgm::write_pgm;
use crate::{Error, GrayImage, ImageFormat, RawLayout, Result, JPEG_QUALITY};

/// Writes the output through a temporary file in the destination directory
/// and renames it over `path` once `write` succeeds. On error the temporary
/// file is removed and `path` is left untouched.
///
/// A replaced file keeps its permissions. A new file gets the same mode a
/// plain `File::create` would give it.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".rawconv").suffix(".tmp");
    // tempfile defaults to 0600; 0666 goes through the umask like a create
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir).map_err(|err| Error::io(dir, err))?;
    {
        let mut writer = io::BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    if let Ok(meta) = fs::metadata(path) {
        file.as_file()
            .set_permissions(meta.permissions())
            .map_err(|err| Error::io(path, err))?;
    }
    file.persist(path).map_err(|err| Error::io(path, err.error))?;
    Ok(())
}

/// Encodes `img` as an 8-bit grayscale PNG.
pub fn encode_png<W: Write>(w: W, img: &GrayImage) -> Result<()> {
    let mut encoder = png::Encoder::new(w, img.width(), img.height());
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(img.as_bytes())?;
    writer.finish()?;
    Ok(())
}

/// Encodes `img` as a single-component baseline JPEG. JPEG caps both
/// dimensions at 65535.
pub fn encode_jpeg<W: Write>(w: W, img: &GrayImage, quality: u8) -> Result<()> {
    let too_big = || Error::InvalidDimensions {
        width: img.width() as u64,
        height: img.height() as u64,
    };
    let width = u16::try_from(img.width()).map_err(|_| too_big())?;
    let height = u16::try_from(img.height()).map_err(|_| too_big())?;
    let encoder = jpeg_encoder::Encoder::new(w, quality);
    encoder.encode(img.as_bytes(), width, height, jpeg_encoder::ColorType::Luma)?;
    Ok(())
}

pub fn encode_image<W: Write>(w: W, img: &GrayImage, format: ImageFormat) -> Result<()> {
    match format {
        ImageFormat::Png => encode_png(w, img),
        ImageFormat::Jpeg => encode_jpeg(w, img, JPEG_QUALITY),
    }
}

/// Saves `img` in the format named by the extension of `path`.
pub fn save_image(path: &Path, img: &GrayImage) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path)?;
    write_atomic(path, |w| encode_image(w, img, format))?;
    debug!(path = %path.display(), ?format, "saved image");
    Ok(format)
}

/// Saves the pixel bytes of `img` in the given raw layout.
pub fn save_raw_frame(path: &Path, img: &GrayImage, layout: RawLayout) -> Result<()> {
    write_atomic(path, |w| {
        match layout {
            RawLayout::Headerless => w.write_all(img.as_bytes())?,
            RawLayout::Pgm => write_pgm(w, img)?,
        }
        Ok(())
    })?;
    debug!(path = %path.display(), ?layout, "saved raw buffer");
    Ok(())
}
