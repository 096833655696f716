//! Reduction of decoded pixel data to single-channel luminance.

/// Interleaved pixel layouts produced by the decoders.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    Cmyk,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::GrayAlpha => 2,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba | PixelLayout::Cmyk => 4,
        }
    }
}

/// ITU-R 601-2 luma transform in 16.16 fixed point.
#[inline]
pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    let l = 19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32 + 0x8000;
    (l >> 16) as u8
}

#[inline]
pub fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let nk = 255 - k as u32;
    let f = |v: u8| ((255 - v as u32) * nk / 255) as u8;
    [f(c), f(m), f(y)]
}

/// Converts interleaved `src` pixels to one luma byte per pixel. Alpha is
/// dropped, gray data is copied as-is. Trailing bytes which do not form a
/// whole pixel are ignored.
pub fn to_grayscale(src: &[u8], layout: PixelLayout) -> Vec<u8> {
    let chunks = src.chunks_exact(layout.channels());
    match layout {
        PixelLayout::Gray => src.to_vec(),
        PixelLayout::GrayAlpha => chunks.map(|p| p[0]).collect(),
        PixelLayout::Rgb | PixelLayout::Rgba => {
            chunks.map(|p| rgb_to_luma(p[0], p[1], p[2])).collect()
        }
        PixelLayout::Cmyk => chunks
            .map(|p| {
                let [r, g, b] = cmyk_to_rgb(p[0], p[1], p[2], p[3]);
                rgb_to_luma(r, g, b)
            })
            .collect(),
    }
}
