use crate::carrier::{CoefficientPlane, DctCarrier, PixelCarrier};

const LABELS: [&str; 3] = ["Y", "Cr", "Cb"];

/// Coefficient planes shaped like a real JPEG: large DC values, AC values
/// shrinking toward high frequencies with plenty of zeros and ones.
pub fn random_dct_carrier(
    seed: u64,
    planes: usize,
    block_rows: usize,
    block_cols: usize,
) -> DctCarrier {
    let mut rng = fastrand::Rng::with_seed(seed);
    let planes = (0..planes)
        .map(|plane| {
            let mut plane =
                CoefficientPlane::new(LABELS[plane % LABELS.len()], block_rows, block_cols);
            for (index, value) in plane.coefficients.iter_mut().enumerate() {
                let intra = index % 64;
                let spread = if intra == 0 { 120 } else { 16 / (1 + intra as i16 / 8) };
                *value = rng.i16(-spread..=spread);
            }
            plane
        })
        .collect();
    DctCarrier::new(planes)
}

pub fn random_pixel_carrier(
    seed: u64,
    width: usize,
    height: usize,
    channels: usize,
) -> PixelCarrier {
    let mut rng = fastrand::Rng::with_seed(seed);
    let samples = (0..width * height * channels).map(|_| rng.u8(..)).collect();
    PixelCarrier {
        width,
        height,
        channels,
        samples,
    }
}
