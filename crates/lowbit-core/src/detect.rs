use std::fmt::{self, Display, Formatter};

use crate::carrier::Carrier;
use crate::diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, Operation};
use crate::stats::{expected_frequencies, uniformity_test, ChiSquare};

pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    StegoSuspected,
    /// No group had a single sample to test.
    Inconclusive,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Clean => "no evidence of hidden data",
            Verdict::StegoSuspected => "hidden data suspected",
            Verdict::Inconclusive => "inconclusive, nothing to test",
        })
    }
}

/// Test result for one plane or channel.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    pub label: String,
    pub observed: [u64; 2],
    pub expected: [u64; 2],
    /// `None` when the group has no samples.
    pub test: Option<ChiSquare>,
}

impl GroupReport {
    pub fn is_inconclusive(&self) -> bool {
        self.test.is_none()
    }

    pub fn p_value(&self) -> Option<f64> {
        self.test.map(|t| t.p_value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub groups: Vec<GroupReport>,
    pub significance: f64,
    pub verdict: Verdict,
}

/// Chi-square test of the low-bit distribution of every plane or channel.
///
/// Each group is tested against an even split of zero and one low bits. A
/// group with a p-value below the significance level flags the image.
/// Metadata records are ignored.
pub struct Detector<'d> {
    significance: f64,
    diagnostics: &'d dyn Diagnostics,
}

impl Default for Detector<'static> {
    fn default() -> Self {
        Detector {
            significance: DEFAULT_SIGNIFICANCE,
            diagnostics: &LogDiagnostics,
        }
    }
}

impl<'d> Detector<'d> {
    pub fn with_diagnostics(diagnostics: &'d dyn Diagnostics) -> Self {
        Detector {
            significance: DEFAULT_SIGNIFICANCE,
            diagnostics,
        }
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn detect<C: Carrier>(&self, carrier: &C) -> Detection {
        let groups: Vec<GroupReport> = carrier
            .low_bit_groups()
            .into_iter()
            .enumerate()
            .map(|(plane, group)| {
                self.diagnostics.on_event(&DiagnosticEvent::ScanStarted {
                    operation: Operation::Detect,
                    plane,
                });
                let total = group.total();
                let report = GroupReport {
                    expected: expected_frequencies(total),
                    test: uniformity_test(group.frequencies),
                    observed: group.frequencies,
                    label: group.label,
                };
                self.diagnostics.on_event(&DiagnosticEvent::ScanFinished {
                    operation: Operation::Detect,
                    plane,
                    bits: total,
                });
                report
            })
            .collect();

        let verdict = if groups.iter().all(GroupReport::is_inconclusive) {
            Verdict::Inconclusive
        } else if groups
            .iter()
            .filter_map(GroupReport::p_value)
            .any(|p| p < self.significance)
        {
            Verdict::StegoSuspected
        } else {
            Verdict::Clean
        };

        Detection {
            groups,
            significance: self.significance,
            verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::Cover;
    use crate::carrier::{BitsPerChannel, CoefficientPlane, DctCarrier, PixelCarrier};
    use crate::embed::Embedder;
    use crate::test_utils::random_pixel_carrier;

    #[test]
    fn fair_low_bits_pass_in_most_trials() {
        let passed = (0..100)
            .filter(|&seed| {
                let carrier = random_pixel_carrier(seed, 32, 32, 3);
                Detector::default().detect(&carrier).groups.iter().all(|g| {
                    g.p_value().map_or(false, |p| p > DEFAULT_SIGNIFICANCE)
                })
            })
            .count();
        // three independent tests at 5% each, about 86 of 100 expected
        assert!(passed >= 70, "only {passed} of 100 trials passed");
    }

    #[test]
    fn opaque_alpha_is_not_tested() {
        let clean = (0..100)
            .filter(|&seed| {
                let mut carrier = random_pixel_carrier(seed, 32, 32, 4);
                carrier
                    .samples
                    .chunks_exact_mut(4)
                    .for_each(|pixel| pixel[3] = 255);
                let detection = Detector::default().detect(&carrier);
                assert!(detection.groups.iter().all(|g| g.label != "A"));
                detection.verdict == Verdict::Clean
            })
            .count();
        assert!(clean >= 70, "only {clean} of 100 opaque images were clean");
    }

    #[test]
    fn all_zero_low_bits_are_suspected() {
        let mut carrier = random_pixel_carrier(1, 16, 16, 3);
        carrier.samples.iter_mut().for_each(|s| *s &= !1);
        let detection = Detector::default().detect(&carrier);
        assert_eq!(detection.verdict, Verdict::StegoSuspected);
        assert!(detection.groups.iter().all(|g| g.observed[1] == 0));
    }

    #[test]
    fn empty_carrier_is_inconclusive() {
        let carrier = PixelCarrier::new(0, 0, 3, Vec::new()).unwrap();
        let detection = Detector::default().detect(&carrier);
        assert_eq!(detection.verdict, Verdict::Inconclusive);
        assert_eq!(detection.groups.len(), 3);

        let zeros = DctCarrier::new(vec![CoefficientPlane::new("Y", 2, 2)]);
        assert_eq!(
            Detector::default().detect(&zeros).verdict,
            Verdict::Inconclusive
        );
    }

    #[test]
    fn one_empty_group_does_not_hide_a_suspicious_one() {
        let mut y = CoefficientPlane::new("Y", 4, 4);
        y.coefficients.iter_mut().for_each(|v| *v = 4);
        let carrier = DctCarrier::new(vec![y, CoefficientPlane::new("Cr", 1, 1)]);

        let detection = Detector::default().detect(&carrier);
        assert_eq!(detection.verdict, Verdict::StegoSuspected);
        assert!(detection.groups[1].is_inconclusive());
    }

    #[test]
    fn detects_sequential_embedding_of_constant_data() {
        let cover = Cover::new(random_pixel_carrier(5, 32, 32, 1));
        let selection = BitsPerChannel::default();

        let capacity = cover.capacity(selection).bytes();
        let stego = Embedder::default()
            .embed(&cover, &vec![0u8; capacity / 2], selection)
            .unwrap();
        let detection = Detector::default().detect(stego.carrier());
        assert_eq!(detection.verdict, Verdict::StegoSuspected);
    }

    #[test]
    fn significance_is_configurable() {
        let mut plane = CoefficientPlane::new("Y", 1, 1);
        // 20 even and 12 odd values, p about 0.157
        plane.coefficients[..20].fill(2);
        plane.coefficients[20..32].fill(3);
        let carrier = DctCarrier::new(vec![plane]);

        assert_eq!(Detector::default().detect(&carrier).verdict, Verdict::Clean);
        let strict = Detector::default().with_significance(0.2);
        assert_eq!(strict.detect(&carrier).verdict, Verdict::StegoSuspected);
    }
}
