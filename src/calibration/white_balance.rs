//! Camera white balance derivation
//!
//! Turns a measured scene CCT and tint into per-channel gain multipliers
//! that move the scene towards a camera's target white point.

use serde::{Deserialize, Serialize};

use crate::constants::camera;

/// Camera white balance multipliers for one measurement
///
/// Multipliers and the ratio are rounded to two decimals for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettings {
    /// Red channel gain
    pub r_multiplier: f64,
    /// Green channel gain
    pub g_multiplier: f64,
    /// Blue channel gain
    pub b_multiplier: f64,
    /// Scene CCT minus target CCT in Kelvin
    pub cct_deviation: f64,
    /// Target CCT divided by scene CCT
    pub cct_ratio: f64,
}

/// White balance calculator bound to a target CCT
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalanceCalculator {
    target_cct: f64,
}

impl WhiteBalanceCalculator {
    /// Create a calculator for the given target CCT in Kelvin
    pub fn new(target_cct: f64) -> Self {
        Self { target_cct }
    }

    /// Target CCT in Kelvin
    pub fn target_cct(&self) -> f64 {
        self.target_cct
    }

    /// Derive camera settings for a scene
    pub fn settings(&self, cct: f64, tint: f64) -> CameraSettings {
        calculate_camera_settings(cct, tint, self.target_cct)
    }
}

impl Default for WhiteBalanceCalculator {
    fn default() -> Self {
        Self::new(camera::DEFAULT_TARGET_CCT_K)
    }
}

/// Derive camera white balance multipliers from scene CCT and tint
///
/// A scene cooler than the target gets a red boost of `sqrt(ratio)`, a warmer
/// scene a blue boost of `sqrt(1/ratio)`, both capped at 2. A green tint adds
/// magenta by scaling red and blue; a magenta tint (or zero) scales green.
///
/// A non-positive or non-finite scene CCT is treated as matching the target.
///
/// # Arguments
///
/// * `cct` - Scene correlated color temperature in Kelvin
/// * `tint` - Scene tint, positive towards green
/// * `target_cct` - Camera white balance target in Kelvin
pub fn calculate_camera_settings(cct: f64, tint: f64, target_cct: f64) -> CameraSettings {
    let cct_ratio = if cct.is_finite() && cct > 0.0 && target_cct.is_finite() {
        target_cct / cct
    } else {
        1.0
    };
    let tint = if tint.is_finite() { tint } else { 0.0 };

    let (mut r_mult, mut b_mult) = if cct_ratio > 1.0 {
        (cct_ratio.sqrt().min(camera::MAX_CHANNEL_MULTIPLIER), 1.0)
    } else {
        (1.0, (1.0 / cct_ratio).sqrt().min(camera::MAX_CHANNEL_MULTIPLIER))
    };

    let tint_adjustment = (tint.abs() / camera::TINT_DIVISOR).min(camera::MAX_TINT_ADJUSTMENT);

    let g_mult = if tint > 0.0 {
        r_mult *= 1.0 + tint_adjustment;
        b_mult *= 1.0 + tint_adjustment;
        1.0
    } else {
        1.0 + tint_adjustment
    };

    let cct_deviation = if cct.is_finite() && target_cct.is_finite() {
        cct - target_cct
    } else {
        0.0
    };

    CameraSettings {
        r_multiplier: round2(r_mult),
        g_multiplier: round2(g_mult),
        b_multiplier: round2(b_mult),
        cct_deviation,
        cct_ratio: round2(cct_ratio),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
