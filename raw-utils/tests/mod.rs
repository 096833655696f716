use std::fs;
use std::path::Path;

use raw_utils::load_frames::{decode_jpeg, decode_png};
use raw_utils::save_frames::{encode_jpeg, encode_png};
use raw_utils::{
    image_to_raw, raw_to_image, Dimensions, Error, GrayImage, RawLayout,
};

fn test_image(width: u32, height: u32) -> Vec<u8> {
    let n = (width * height) as usize;
    (0..n).map(|n| (n * 7 % 256) as u8).collect()
}

fn dims(width: u32, height: u32) -> Dimensions {
    Dimensions::new(width, height).unwrap()
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn png_roundtrip_is_exact() {
    let tmp = tempfile::tempdir().unwrap();
    for &(w, h) in [(2, 2), (32, 32), (16, 16), (57, 23)].iter() {
        let raw = tmp.path().join("in.raw");
        let png = tmp.path().join("out.png");
        let back = tmp.path().join("back.raw");
        let data = test_image(w, h);
        fs::write(&raw, &data).unwrap();

        raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(w, h))).unwrap();
        let img = image_to_raw(&png, &back, RawLayout::Headerless).unwrap();
        assert_eq!(img.dimensions(), dims(w, h));
        assert_eq!(fs::read(&back).unwrap(), data);
    }
}

#[test]
fn two_by_two_example() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("px.raw");
    let png = tmp.path().join("px.png");
    let back = tmp.path().join("px_back.raw");
    fs::write(&raw, [0u8, 128, 255, 64]).unwrap();

    raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(2, 2))).unwrap();
    image_to_raw(&png, &back, RawLayout::Headerless).unwrap();
    assert_eq!(fs::read(&back).unwrap(), vec![0u8, 128, 255, 64]);
}

#[test]
fn jpeg_roundtrip_is_approximate() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("in.raw");
    let jpg = tmp.path().join("out.jpg");
    let back = tmp.path().join("back.raw");
    // smooth gradient, JPEG keeps it close
    let data: Vec<u8> = (0..32 * 32).map(|n| ((n % 32) * 8) as u8).collect();
    fs::write(&raw, &data).unwrap();

    raw_to_image(&raw, &jpg, RawLayout::Headerless, Some(dims(32, 32))).unwrap();
    let img = image_to_raw(&jpg, &back, RawLayout::Headerless).unwrap();
    assert_eq!(img.dimensions(), dims(32, 32));

    let decoded = fs::read(&back).unwrap();
    assert_eq!(decoded.len(), data.len());
    let max_diff = data
        .iter()
        .zip(decoded.iter())
        .map(|(a, b)| (*a as i16 - *b as i16).abs())
        .max()
        .unwrap();
    assert!(max_diff <= 32, "max difference {}", max_diff);
}

#[test]
fn size_mismatch_leaves_no_output() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("short.raw");
    let png = tmp.path().join("short.png");
    fs::write(&raw, [1u8, 2, 3]).unwrap();

    match raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(2, 2))) {
        Err(Error::SizeMismatch { expected: 4, actual: 3 }) => (),
        res => panic!("unexpected result {:?}", res),
    }
    assert_eq!(dir_entries(tmp.path()), vec!["short.raw".to_string()]);
}

#[test]
fn missing_input_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("missing.raw");
    let png = tmp.path().join("missing.png");
    match raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(2, 2))) {
        Err(Error::NotFound(path)) => assert_eq!(path, raw),
        res => panic!("unexpected result {:?}", res),
    }
    match image_to_raw(&png, &raw, RawLayout::Headerless) {
        Err(Error::NotFound(path)) => assert_eq!(path, png),
        res => panic!("unexpected result {:?}", res),
    }
}

#[test]
fn output_format_checked_first() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("missing.raw");
    let out = tmp.path().join("out.bmp");
    match raw_to_image(&raw, &out, RawLayout::Headerless, Some(dims(2, 2))) {
        Err(Error::UnsupportedFormat(ext)) => assert_eq!(ext, "bmp"),
        res => panic!("unexpected result {:?}", res),
    }
}

#[test]
fn headerless_needs_dimensions() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("in.raw");
    fs::write(&raw, [0u8; 4]).unwrap();
    match raw_to_image(&raw, &tmp.path().join("o.png"), RawLayout::Headerless, None) {
        Err(Error::MissingDimensions) => (),
        res => panic!("unexpected result {:?}", res),
    }
}

#[test]
fn overwrites_existing_output() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("in.raw");
    let png = tmp.path().join("out.png");
    fs::write(&raw, test_image(8, 8)).unwrap();
    fs::write(&png, b"stale").unwrap();

    raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(8, 8))).unwrap();
    let encoded = fs::read(&png).unwrap();
    assert_eq!(&encoded[1..4], b"PNG");
    assert_eq!(
        dir_entries(tmp.path()),
        vec!["in.raw".to_string(), "out.png".to_string()],
    );
}

#[cfg(unix)]
fn mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[cfg(unix)]
#[test]
fn new_outputs_follow_umask() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("in.raw");
    let png = tmp.path().join("out.png");
    let pgm = tmp.path().join("out.pgm");
    fs::write(&raw, test_image(4, 4)).unwrap();

    raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(4, 4))).unwrap();
    image_to_raw(&png, &pgm, RawLayout::Pgm).unwrap();
    assert_eq!(mode(&png), mode(&raw));
    assert_eq!(mode(&pgm), mode(&raw));
}

#[cfg(unix)]
#[test]
fn overwrite_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("in.raw");
    let png = tmp.path().join("out.png");
    fs::write(&raw, test_image(4, 4)).unwrap();
    fs::write(&png, b"stale").unwrap();
    fs::set_permissions(&png, fs::Permissions::from_mode(0o640)).unwrap();

    raw_to_image(&raw, &png, RawLayout::Headerless, Some(dims(4, 4))).unwrap();
    assert_eq!(&fs::read(&png).unwrap()[1..4], b"PNG");
    assert_eq!(mode(&png), 0o640);
}

#[test]
fn pgm_layout_is_self_describing() {
    let tmp = tempfile::tempdir().unwrap();
    let png = tmp.path().join("in.png");
    let pgm = tmp.path().join("in.pgm");
    let out = tmp.path().join("out.png");
    let img = GrayImage::from_raw(dims(5, 3), test_image(5, 3)).unwrap();
    let mut encoded = Vec::new();
    encode_png(&mut encoded, &img).unwrap();
    fs::write(&png, &encoded).unwrap();

    image_to_raw(&png, &pgm, RawLayout::Pgm).unwrap();
    let bytes = fs::read(&pgm).unwrap();
    assert!(bytes.starts_with(b"P5\n5 3\n255\n"));

    let back = raw_to_image(&pgm, &out, RawLayout::Pgm, None).unwrap();
    assert_eq!(back, img);

    match raw_to_image(&pgm, &out, RawLayout::Pgm, Some(dims(3, 5))) {
        Err(Error::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, dims(3, 5));
            assert_eq!(actual, dims(5, 3));
        }
        res => panic!("unexpected result {:?}", res),
    }
}

fn rgb_png(width: u32, height: u32, rgb: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(rgb).unwrap();
    }
    buf
}

#[test]
fn color_png_to_grayscale() {
    // red, green / blue, white
    let rgb = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
    let img = decode_png(&rgb_png(2, 2, &rgb)[..]).unwrap();
    assert_eq!(img.as_bytes(), &[76, 150, 29, 255]);
}

#[test]
fn grayscale_decoding_is_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    let png = tmp.path().join("color.png");
    let rgb: Vec<u8> = (0..16 * 16 * 3).map(|n| (n * 13 % 256) as u8).collect();
    fs::write(&png, rgb_png(16, 16, &rgb)).unwrap();

    let first = tmp.path().join("first.raw");
    let second = tmp.path().join("second.raw");
    image_to_raw(&png, &first, RawLayout::Headerless).unwrap();
    image_to_raw(&png, &second, RawLayout::Headerless).unwrap();
    let first = fs::read(&first).unwrap();
    assert_eq!(first.len(), 256);
    assert_eq!(first, fs::read(&second).unwrap());
}

#[test]
fn jpeg_grayscale_sanity_check() {
    // 2x2 white diagonal, mirrors the encoder round-trip check
    let img = GrayImage::from_raw(dims(2, 2), vec![255u8, 0, 0, 255]).unwrap();
    let mut encoded = Vec::new();
    encode_jpeg(&mut encoded, &img, 100).unwrap();
    let decoded = decode_jpeg(&encoded[..]).unwrap();
    let px = decoded.as_bytes();
    assert_eq!(px.len(), 4);
    assert!(px[0] > 0x80);
    assert!(px[1] < 0x80);
    assert!(px[2] < 0x80);
    assert!(px[3] > 0x80);
}

#[test]
fn corrupt_image_is_decode_error() {
    let tmp = tempfile::tempdir().unwrap();
    let jpg = tmp.path().join("broken.jpg");
    let raw = tmp.path().join("broken.raw");
    fs::write(&jpg, b"definitely not a jpeg").unwrap();
    let err = image_to_raw(&jpg, &raw, RawLayout::Headerless).unwrap_err();
    assert!(err.is_decode(), "{:?}", err);
    assert!(!raw.exists());
}
