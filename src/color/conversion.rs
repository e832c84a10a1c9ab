//! Display conversion for measured light
//!
//! Turns the engine's raw tristimulus sums into something a dashboard can
//! paint: an sRGB swatch of the light's color at full brightness.

use palette::white_point::D65;
use palette::convert::FromColorUnclamped;
use palette::{FromColor, Srgb, Xyz};

/// Converts tristimulus readings to display colors
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    /// Create a new converter
    pub fn new() -> Self {
        Self
    }

    /// Convert XYZ to gamut-clamped sRGB after normalising to Y = 1
    ///
    /// The engine's XYZ is not normalised by luminance, so the swatch shows
    /// the chromaticity of the light rather than its brightness. Zero or
    /// non-finite luminance gives black.
    pub fn xyz_to_srgb(&self, xyz: Xyz<D65, f64>) -> Srgb<f64> {
        if xyz.y <= 0.0 || !xyz.y.is_finite() {
            return Srgb::new(0.0, 0.0, 0.0);
        }
        let normalized = Xyz::<D65, f64>::new(xyz.x / xyz.y, 1.0, xyz.z / xyz.y);
        let srgb = Srgb::<f64>::from_color(normalized);
        Srgb::new(
            clamp_unit(srgb.red),
            clamp_unit(srgb.green),
            clamp_unit(srgb.blue),
        )
    }

    /// Check whether the normalised light color fits sRGB without clipping
    pub fn is_in_srgb_gamut(&self, xyz: Xyz<D65, f64>) -> bool {
        if xyz.y <= 0.0 || !xyz.y.is_finite() {
            return true;
        }
        let normalized = Xyz::<D65, f64>::new(xyz.x / xyz.y, 1.0, xyz.z / xyz.y);
        let srgb = Srgb::<f64>::from_color_unclamped(normalized);
        // small tolerance for the D65 white round trip
        [srgb.red, srgb.green, srgb.blue]
            .iter()
            .all(|c| (-1e-3..=1.0 + 1e-3).contains(c))
    }

    /// Format sRGB as `#RRGGBB`
    pub fn srgb_to_hex(&self, srgb: Srgb<f64>) -> String {
        let r = (clamp_unit(srgb.red) * 255.0).round() as u8;
        let g = (clamp_unit(srgb.green) * 255.0).round() as u8;
        let b = (clamp_unit(srgb.blue) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Hex swatch of a measured light
    pub fn preview_hex(&self, xyz: Xyz<D65, f64>) -> String {
        self.srgb_to_hex(self.xyz_to_srgb(xyz))
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
