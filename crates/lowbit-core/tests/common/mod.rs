#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

/// A smooth gradient with some noise, so that a JPEG has both low and high
/// frequency coefficients and a PNG has uniform low bits.
pub fn pixels(width: u32, height: u32, channels: u32, seed: u64) -> Vec<u8> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..width * height * channels)
        .map(|i| {
            let x = (i / channels) % width;
            let y = (i / channels) / width;
            ((x * 3 + y * 2 + (i % channels) * 40) as u8).wrapping_add(rng.u8(0..32))
        })
        .collect()
}

pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32, color: ColorType) -> PathBuf {
    let channels = match color {
        ColorType::L8 => 1,
        _ => 3,
    };
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, 90)
        .encode(&pixels(width, height, channels, 7), width, height, color)
        .expect("encode test JPEG");
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write test JPEG");
    path
}

pub fn write_bitmap(dir: &Path, name: &str, width: u32, height: u32, color: ColorType) -> PathBuf {
    let channels = u32::from(color.channel_count());
    let path = dir.join(name);
    image::save_buffer(&path, &pixels(width, height, channels, 11), width, height, color)
        .expect("write test bitmap");
    path
}

/// Inserts an APP1 segment right after SOI whose Exif IFD holds only a
/// `UserComment` with the given raw bytes.
pub fn with_exif_user_comment(jpeg: &[u8], comment: &[u8]) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2A\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0 at 8 holds the Exif IFD pointer
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD at 26, value at 44
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9286u16.to_le_bytes());
    tiff.extend_from_slice(&7u16.to_le_bytes());
    tiff.extend_from_slice(&(comment.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(comment);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
