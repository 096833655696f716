use std::path::Path;

use tracing::debug;

use crate::load_frames::{load_image, load_raw_frame};
use crate::save_frames::{save_image, save_raw_frame};
use crate::{Dimensions, GrayImage, ImageFormat, RawLayout, Result};

/// Renders the raw grayscale buffer at `src` as a PNG or JPEG at `dst`.
///
/// The output format comes from the extension of `dst` and is checked before
/// `src` is touched. Headerless input requires `dims`; PGM input carries its
/// own dimensions and `dims`, if given, must agree with them.
pub fn raw_to_image(
    src: &Path, dst: &Path, layout: RawLayout, dims: Option<Dimensions>,
) -> Result<GrayImage> {
    ImageFormat::from_path(dst)?;
    let img = load_raw_frame(src, layout, dims)?;
    let format = save_image(dst, &img)?;
    debug!(
        src = %src.display(), dst = %dst.display(),
        dims = %img.dimensions(), ?format,
        "converted raw buffer to image"
    );
    Ok(img)
}

/// Decodes the PNG or JPEG at `src`, reduces it to grayscale and writes the
/// row-major pixel bytes to `dst`.
pub fn image_to_raw(src: &Path, dst: &Path, layout: RawLayout) -> Result<GrayImage> {
    let img = load_image(src)?;
    save_raw_frame(dst, &img, layout)?;
    debug!(
        src = %src.display(), dst = %dst.display(),
        dims = %img.dimensions(), ?layout,
        "converted image to raw buffer"
    );
    Ok(img)
}
