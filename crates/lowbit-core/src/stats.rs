//! Chi-square goodness of fit for two buckets.
//!
//! Everything is computed in plain `f64` arithmetic so results are identical
//! on every platform.

/// Outcome of one goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquare {
    pub statistic: f64,
    pub p_value: f64,
}

/// Even split of `total` samples, the odd one going to the second bucket.
pub fn expected_frequencies(total: u64) -> [u64; 2] {
    [total / 2, total / 2 + total % 2]
}

/// Pearson's statistic. An empty expected bucket with observations in it
/// makes the statistic infinite.
pub fn chi_square_statistic(observed: [u64; 2], expected: [u64; 2]) -> f64 {
    observed
        .iter()
        .zip(&expected)
        .map(|(&o, &e)| {
            if e == 0 {
                if o == 0 {
                    0.0
                } else {
                    f64::INFINITY
                }
            } else {
                let diff = o as f64 - e as f64;
                diff * diff / e as f64
            }
        })
        .sum()
}

/// Upper tail probability of a chi-square variable with one degree of freedom.
pub fn p_value_one_dof(statistic: f64) -> f64 {
    if statistic.is_infinite() {
        return 0.0;
    }
    erfc((statistic / 2.0).sqrt())
}

/// Tests observed low-bit frequencies against an even split.
///
/// Returns `None` when there is nothing to test.
pub fn uniformity_test(observed: [u64; 2]) -> Option<ChiSquare> {
    let total = observed[0] + observed[1];
    if total == 0 {
        return None;
    }
    let statistic = chi_square_statistic(observed, expected_frequencies(total));
    Some(ChiSquare {
        statistic,
        p_value: p_value_one_dof(statistic),
    })
}

/// Complementary error function, Chebyshev fit with a fractional error below 1.2e-7.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * (-z * z + poly).exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}
