use image::GrayImage;

use crate::error::LowbitError;
use crate::result::Result;

/// Makes the lowest bit planes of an image visible.
///
/// Keeps the `bits` least significant bits of every luminance value and
/// shifts them left by `boost`. Hidden data shows up as noise where the
/// image would otherwise be smooth.
pub fn visual_attack(image: &GrayImage, bits: u8, boost: u8) -> Result<GrayImage> {
    if !(1..=8).contains(&bits) || boost > 7 {
        return Err(LowbitError::InvalidVisualAttack { bits, boost });
    }
    let mask = 0xFFu8 >> (8 - bits);
    let mut attacked = image.clone();
    for pixel in attacked.pixels_mut() {
        pixel.0[0] = (pixel.0[0] & mask) << boost;
    }
    Ok(attacked)
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    #[test]
    fn masks_then_boosts() {
        let image = GrayImage::from_pixel(2, 1, Luma([0b1011_0111]));
        let attacked = visual_attack(&image, 2, 6).unwrap();
        assert_eq!(attacked.get_pixel(1, 0), &Luma([0b1100_0000]));

        let attacked = visual_attack(&image, 8, 0).unwrap();
        assert_eq!(attacked, image);
    }

    #[test]
    fn boost_truncates_to_eight_bits() {
        let image = GrayImage::from_pixel(1, 1, Luma([0b0000_0111]));
        let attacked = visual_attack(&image, 3, 7).unwrap();
        assert_eq!(attacked.get_pixel(0, 0), &Luma([0b1000_0000]));
    }

    #[test]
    fn rejects_out_of_range_arguments() {
        let image = GrayImage::new(1, 1);
        assert!(visual_attack(&image, 0, 1).is_err());
        assert!(visual_attack(&image, 9, 1).is_err());
        assert!(visual_attack(&image, 1, 8).is_err());
    }
}
