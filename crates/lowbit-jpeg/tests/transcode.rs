use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use lowbit_jpeg::{JpegCoefficients, BLOCK_LEN};

fn encoded_image(width: u32, height: u32, color: ColorType, seed: u64) -> Vec<u8> {
    let channels = match color {
        ColorType::L8 => 1,
        _ => 3,
    };
    let mut rng = fastrand::Rng::with_seed(seed);
    // smooth gradient with noise so that both low and high frequencies show up
    let pixels: Vec<u8> = (0..width * height * channels)
        .map(|i| {
            let x = (i / channels) % width;
            let y = (i / channels) / width;
            ((x * 3 + y * 2) as u8).wrapping_add(rng.u8(0..24))
        })
        .collect();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 85)
        .encode(&pixels, width, height, color)
        .expect("encode test image");
    out
}

#[test]
fn color_image_survives_a_transcode() {
    let original = encoded_image(61, 45, ColorType::Rgb8, 1);
    let jpeg = JpegCoefficients::decode(&original).expect("decode coefficients");
    assert_eq!(jpeg.components().len(), 3);

    let reencoded = jpeg.encode().expect("encode coefficients");
    let again = JpegCoefficients::decode(&reencoded).expect("decode re-encoded");
    assert_eq!(again.components(), jpeg.components());

    let pixels = image::load_from_memory(&reencoded).expect("standard decoder accepts output");
    assert_eq!((pixels.width(), pixels.height()), (61, 45));
}

#[test]
fn grayscale_image_has_a_single_plane() {
    let original = encoded_image(40, 24, ColorType::L8, 2);
    let jpeg = JpegCoefficients::decode(&original).expect("decode coefficients");

    assert_eq!(jpeg.components().len(), 1);
    let plane = &jpeg.components()[0];
    assert_eq!((plane.block_rows, plane.block_cols), (3, 5));
    assert_eq!(plane.coefficients.len(), 15 * BLOCK_LEN);
}

#[test]
fn modified_low_bits_are_preserved() {
    let original = encoded_image(64, 64, ColorType::Rgb8, 3);
    let mut jpeg = JpegCoefficients::decode(&original).expect("decode coefficients");

    let mut flipped = 0;
    for component in jpeg.components_mut() {
        for value in component.coefficients.iter_mut() {
            if !matches!(*value, 0 | 1) {
                *value ^= 1;
                flipped += 1;
            }
        }
    }
    assert!(flipped > 0);

    let decoded =
        JpegCoefficients::decode(&jpeg.encode().expect("encode")).expect("decode modified");
    assert_eq!(decoded.components(), jpeg.components());
}

#[test]
fn cropped_image_decodes_with_the_new_dimensions() {
    let original = encoded_image(96, 48, ColorType::Rgb8, 4);
    let mut jpeg = JpegCoefficients::decode(&original).expect("decode coefficients");
    let layout = jpeg.layout().expect("layout");

    let rows = layout.mcu_rows / 3..2 * layout.mcu_rows / 3;
    let cols = layout.mcu_cols / 3..2 * layout.mcu_cols / 3;
    jpeg.crop_mcus(rows.clone(), cols.clone()).expect("crop");

    let pixels = image::load_from_memory(&jpeg.encode().expect("encode")).expect("decode pixels");
    assert_eq!(pixels.width() as usize, cols.len() * layout.mcu_width);
    assert_eq!(pixels.height() as usize, rows.len() * layout.mcu_height);
}
