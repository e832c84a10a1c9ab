//! Correlated color temperature and tint from spectral channels
//!
//! Pure functions that take six AS7262 band intensities through CIE XYZ,
//! xy chromaticity and u'v' to a McCamy CCT and a Duv-style tint.
//!
//! None of these functions fail. Degenerate input (all-zero channels, NaN,
//! infinities) maps to documented fallbacks instead of propagating NaN.

use palette::white_point::D65;
use palette::Xyz;
use serde::{Deserialize, Serialize};

use super::spectrum::SpectralChannels;
use crate::constants::{cie, mccamy, planckian, tint};

/// CIE 1931 xy chromaticity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Chromaticity {
    pub x: f64,
    pub y: f64,
}

/// CIE 1976 u'v' coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UvCoordinates {
    pub u: f64,
    pub v: f64,
}

/// Result of one color temperature computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorResult {
    /// McCamy CCT in Kelvin, a multiple of 50 in [2000, 7000]
    pub cct: f64,
    /// Tint in [-10, 10], positive towards green
    pub tint: f64,
    pub chromaticity: Chromaticity,
    pub uv: UvCoordinates,
    /// Raw tristimulus sums (not normalised to Y)
    pub xyz: Xyz<D65, f64>,
}

/// Weighted CIE tristimulus sums of the six channels
///
/// Negative and non-finite channels count as zero. All-zero input returns
/// the origin.
pub fn calculate_xyz(channels: &SpectralChannels) -> Xyz<D65, f64> {
    let values = channels.sanitized().to_array();
    if values.iter().sum::<f64>() == 0.0 {
        return Xyz::new(0.0, 0.0, 0.0);
    }

    let weighted = |coefficients: &[f64; 6]| -> f64 {
        values
            .iter()
            .zip(coefficients.iter())
            .map(|(v, c)| v * c)
            .sum()
    };

    Xyz::new(
        weighted(&cie::X_COEFFICIENTS),
        weighted(&cie::Y_COEFFICIENTS),
        weighted(&cie::Z_COEFFICIENTS),
    )
}

/// Project XYZ onto the xy plane
///
/// Returns `{0, 0}` when `X + Y + Z` is zero or not finite.
pub fn calculate_chromaticity(xyz: &Xyz<D65, f64>) -> Chromaticity {
    let sum = xyz.x + xyz.y + xyz.z;
    if sum == 0.0 || !sum.is_finite() {
        return Chromaticity::default();
    }
    Chromaticity {
        x: xyz.x / sum,
        y: xyz.y / sum,
    }
}

/// McCamy's cubic CCT approximation
///
/// The result is clamped to [2000, 7000] K and rounded to the nearest 50 K.
/// Chromaticity `{0, 0}` (no signal) and any input the cubic cannot
/// evaluate return 6500 K.
pub fn calculate_cct_mccamy(chromaticity: Chromaticity) -> f64 {
    let Chromaticity { x, y } = chromaticity;
    if x == 0.0 && y == 0.0 {
        return mccamy::NO_SIGNAL_CCT_K;
    }

    let n = (x - mccamy::EPICENTER_X) / (y - mccamy::EPICENTER_Y);
    let cct = mccamy::A3 * n.powi(3) + mccamy::A2 * n.powi(2) + mccamy::A1 * n + mccamy::A0;
    if cct.is_nan() {
        return mccamy::NO_SIGNAL_CCT_K;
    }

    let clamped = cct.clamp(mccamy::MIN_CCT_K, mccamy::MAX_CCT_K);
    (clamped / mccamy::BUCKET_K).round() * mccamy::BUCKET_K
}

/// Convert xy chromaticity to CIE 1976 u'v'
///
/// A zero or non-finite denominator yields `{0, 0}`.
pub fn calculate_uv(chromaticity: Chromaticity) -> UvCoordinates {
    let Chromaticity { x, y } = chromaticity;
    let denominator = -2.0 * x + 12.0 * y + 3.0;
    if denominator == 0.0 || !denominator.is_finite() {
        return UvCoordinates::default();
    }
    UvCoordinates {
        u: 4.0 * x / denominator,
        v: 9.0 * y / denominator,
    }
}

/// Approximate u'v' of the Planckian locus at `cct`
///
/// Uses one cubic fit up to and including 4000 K and another above it. The
/// two fits do not meet at the boundary.
pub fn calculate_planckian_uv(cct: f64) -> UvCoordinates {
    let (u_coeffs, v_coeffs) = if cct <= planckian::BRANCH_K {
        (&planckian::LOW_U, &planckian::LOW_V)
    } else {
        (&planckian::HIGH_U, &planckian::HIGH_V)
    };
    UvCoordinates {
        u: cubic(u_coeffs, cct),
        v: cubic(v_coeffs, cct),
    }
}

/// Signed offset from the Planckian locus, clamped to [-10, 10]
///
/// `duv = dv - 0.436 * du`, scaled by 0.01 and then by 100. Non-finite
/// results report 0.
pub fn calculate_tint(uv: UvCoordinates, cct: f64) -> f64 {
    let locus = calculate_planckian_uv(cct);
    let du = uv.u - locus.u;
    let dv = uv.v - locus.v;
    let duv = dv - tint::ISOTHERM_SLOPE * du;

    let scaled = duv * tint::NORMALIZE_FACTOR * tint::DISPLAY_FACTOR;
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(-tint::LIMIT, tint::LIMIT)
}

/// Run the full chain from spectral channels to CCT and tint
pub fn calculate_color_temperature(channels: &SpectralChannels) -> ColorResult {
    let xyz = calculate_xyz(channels);
    let chromaticity = calculate_chromaticity(&xyz);
    let cct = calculate_cct_mccamy(chromaticity);
    let uv = calculate_uv(chromaticity);
    let tint = calculate_tint(uv, cct);

    ColorResult {
        cct,
        tint,
        chromaticity,
        uv,
        xyz,
    }
}

fn cubic(coefficients: &[f64; 4], t: f64) -> f64 {
    coefficients[0] + coefficients[1] * t + coefficients[2] * t.powi(2) + coefficients[3] * t.powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn reference_sample() -> SpectralChannels {
        SpectralChannels::new(34.2, 38.9, 54.5, 61.1, 57.5, 48.5)
    }

    #[test]
    fn test_reference_sample_xyz() {
        let xyz = calculate_xyz(&reference_sample());
        assert_relative_eq!(xyz.x, 63.18525, epsilon = 1e-9);
        assert_relative_eq!(xyz.y, 59.90778, epsilon = 1e-9);
        assert_relative_eq!(xyz.z, 32.26543, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_sample_result() {
        let result = calculate_color_temperature(&reference_sample());
        assert_relative_eq!(result.chromaticity.x, 0.406706, epsilon = 1e-5);
        assert_relative_eq!(result.chromaticity.y, 0.385610, epsilon = 1e-5);
        // cubic gives ~3485 K
        assert_eq!(result.cct, 3500.0);
        assert_relative_eq!(result.uv.u, 0.238751, epsilon = 1e-5);
        assert_relative_eq!(result.uv.v, 0.509325, epsilon = 1e-5);
        assert_relative_eq!(result.tint, -0.235055, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_signal() {
        let result = calculate_color_temperature(&SpectralChannels::default());
        assert_eq!(result.xyz, Xyz::new(0.0, 0.0, 0.0));
        assert_eq!(result.chromaticity, Chromaticity::default());
        assert_eq!(result.cct, 6500.0);
        assert!(result.tint.is_finite());
        assert!((-10.0..=10.0).contains(&result.tint));
    }

    #[test]
    fn test_nan_and_negative_channels_are_ignored() {
        let bad = SpectralChannels::new(f64::NAN, -5.0, 0.0, 0.0, 0.0, 0.0);
        let result = calculate_color_temperature(&bad);
        assert_eq!(result.cct, 6500.0);
        assert!(result.tint.is_finite());
    }

    #[test]
    fn test_mccamy_illuminant_a() {
        // cubic gives ~2985 K
        let cct = calculate_cct_mccamy(Chromaticity {
            x: 0.44757,
            y: 0.40745,
        });
        assert_eq!(cct, 3000.0);
    }

    #[test]
    fn test_mccamy_clamps_both_ends() {
        assert_eq!(calculate_cct_mccamy(Chromaticity { x: 0.7, y: 0.15 }), 2000.0);
        assert_eq!(calculate_cct_mccamy(Chromaticity { x: 0.25, y: 0.25 }), 7000.0);
    }

    #[test]
    fn test_mccamy_d65_white() {
        let cct = calculate_cct_mccamy(Chromaticity {
            x: 0.31271,
            y: 0.32902,
        });
        assert_eq!(cct, 6500.0);
    }

    #[test]
    fn test_planckian_branch_boundary_is_discontinuous() {
        let low = calculate_planckian_uv(4000.0);
        let high = calculate_planckian_uv(4000.0 + 1e-6);
        assert!((low.u - high.u).abs() > 1e-4);
    }

    #[test]
    fn test_uv_degenerate_denominator() {
        // -2x + 12y + 3 = 0
        let uv = calculate_uv(Chromaticity { x: 1.5, y: 0.0 });
        assert_eq!(uv, UvCoordinates::default());
    }

    #[test]
    fn test_tint_is_clamped() {
        let uv = UvCoordinates { u: 0.0, v: 100.0 };
        assert_eq!(calculate_tint(uv, 5000.0), 10.0);
        let uv = UvCoordinates { u: 0.0, v: -100.0 };
        assert_eq!(calculate_tint(uv, 5000.0), -10.0);
    }

    #[test]
    fn test_color_result_serializes_xyz() {
        let json = serde_json::to_value(calculate_color_temperature(&reference_sample())).unwrap();
        assert!(json["xyz"]["x"].is_number());
        assert!(json["chromaticity"]["y"].is_number());
        assert_eq!(json["cct"], 3500.0);
    }

    proptest! {
        #[test]
        fn prop_xyz_non_negative(values in prop::array::uniform6(0.0f64..70000.0)) {
            let xyz = calculate_xyz(&SpectralChannels::from_array(values));
            prop_assert!(xyz.x >= 0.0 && xyz.y >= 0.0 && xyz.z >= 0.0);
        }

        #[test]
        fn prop_chromaticity_in_unit_square(values in prop::array::uniform6(0.0f64..70000.0)) {
            let xyz = calculate_xyz(&SpectralChannels::from_array(values));
            let c = calculate_chromaticity(&xyz);
            if xyz.x + xyz.y + xyz.z > 0.0 {
                prop_assert!((0.0..=1.0).contains(&c.x));
                prop_assert!((0.0..=1.0).contains(&c.y));
            } else {
                prop_assert_eq!(c, Chromaticity::default());
            }
        }

        #[test]
        fn prop_mccamy_bucket_and_range(x in -10.0f64..10.0, y in -10.0f64..10.0) {
            let cct = calculate_cct_mccamy(Chromaticity { x, y });
            prop_assert!((2000.0..=7000.0).contains(&cct));
            prop_assert_eq!(cct % 50.0, 0.0);
        }

        #[test]
        fn prop_tint_in_range(u in -10.0f64..10.0, v in -10.0f64..10.0, cct in 0.0f64..20000.0) {
            let t = calculate_tint(UvCoordinates { u, v }, cct);
            prop_assert!((-10.0..=10.0).contains(&t));
        }
    }
}
