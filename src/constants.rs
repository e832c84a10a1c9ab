//! Reference constants for color computation and sensor simulation
//!
//! Compile-time tables for the colorimetric engine and for the synthetic
//! sensor models, grouped by concern.

/// CIE 1931 2° observer weights sampled at the six AS7262 channel centres
///
/// Order is violet (450nm), blue (500nm), green (550nm), yellow (570nm),
/// orange (600nm), red (650nm).
pub mod cie {
    /// X tristimulus weight per channel
    pub const X_COEFFICIENTS: [f64; 6] = [0.0143, 0.0435, 0.1344, 0.2839, 0.3483, 0.3362];

    /// Y tristimulus weight per channel
    pub const Y_COEFFICIENTS: [f64; 6] = [0.0004, 0.0120, 0.0950, 0.3230, 0.5100, 0.1070];

    /// Z tristimulus weight per channel
    pub const Z_COEFFICIENTS: [f64; 6] = [0.0679, 0.2074, 0.2378, 0.1094, 0.0361, 0.0032];

    /// Channel centre wavelengths in nanometres
    pub const WAVELENGTHS_NM: [u32; 6] = [450, 500, 550, 570, 600, 650];
}

/// McCamy cubic approximation and the CCT output range
pub mod mccamy {
    /// Epicentre x coordinate
    pub const EPICENTER_X: f64 = 0.3320;
    /// Epicentre y coordinate
    pub const EPICENTER_Y: f64 = 0.1858;

    /// Cubic coefficients, highest order first
    pub const A3: f64 = 449.0;
    pub const A2: f64 = 3525.0;
    pub const A1: f64 = -6823.3;
    pub const A0: f64 = 5520.33;

    /// Lower CCT clamp in Kelvin
    pub const MIN_CCT_K: f64 = 2000.0;
    /// Upper CCT clamp in Kelvin
    pub const MAX_CCT_K: f64 = 7000.0;
    /// Output bucket size in Kelvin
    pub const BUCKET_K: f64 = 50.0;
    /// Returned when there is no signal (chromaticity exactly 0,0)
    pub const NO_SIGNAL_CCT_K: f64 = 6500.0;
}

/// Planckian locus polynomial fits in CIE 1976 u'v'
///
/// Two disjoint cubic fits in T, selected at 4000 K. The two branches are not
/// continuous at the boundary.
pub mod planckian {
    /// Boundary between the low and high fits (inclusive on the low side)
    pub const BRANCH_K: f64 = 4000.0;

    /// u' coefficients for T <= 4000 K, constant term first
    pub const LOW_U: [f64; 4] = [0.179910, 0.8776956e-4, -0.2343589e-7, -0.2661239e-10];
    /// v' coefficients for T <= 4000 K
    pub const LOW_V: [f64; 4] = [0.283593, -0.10733e-4, 0.99381e-8, -0.3213e-11];

    /// u' coefficients for T > 4000 K
    pub const HIGH_U: [f64; 4] = [0.1950439, 0.2246008e-4, -0.65471e-8, -0.6358e-12];
    /// v' coefficients for T > 4000 K
    pub const HIGH_V: [f64; 4] = [0.2831483, -0.4277005e-5, 0.7573e-9, -0.4956e-13];
}

/// Tint (Duv) scaling and range
pub mod tint {
    /// Approximate slope of the isotemperature line in u'v'
    pub const ISOTHERM_SLOPE: f64 = 0.436;
    /// First scaling step applied to Duv
    pub const NORMALIZE_FACTOR: f64 = 0.01;
    /// Second scaling step applied after normalisation
    pub const DISPLAY_FACTOR: f64 = 100.0;
    /// Symmetric clamp for the reported tint
    pub const LIMIT: f64 = 10.0;
}

/// Camera white balance derivation
pub mod camera {
    /// Default camera white balance target in Kelvin
    pub const DEFAULT_TARGET_CCT_K: f64 = 5600.0;
    /// Lowest accepted target CCT
    pub const MIN_TARGET_CCT_K: f64 = 2000.0;
    /// Highest accepted target CCT
    pub const MAX_TARGET_CCT_K: f64 = 10000.0;
    /// Ceiling for the red/blue CCT multiplier
    pub const MAX_CHANNEL_MULTIPLIER: f64 = 2.0;
    /// Ceiling for the tint correction term
    pub const MAX_TINT_ADJUSTMENT: f64 = 0.5;
    /// Tint units per unit of correction
    pub const TINT_DIVISOR: f64 = 20.0;
}

/// Noise filter defaults
pub mod filtering {
    /// History length for buffer-based filters
    pub const DEFAULT_WINDOW_SIZE: usize = 10;
    /// Exponential smoothing factor
    pub const DEFAULT_ALPHA: f64 = 0.2;
    /// Kalman process noise (Q)
    pub const DEFAULT_PROCESS_NOISE: f64 = 0.01;
    /// Kalman measurement noise (R)
    pub const DEFAULT_MEASUREMENT_NOISE: f64 = 1.0;
    /// Kalman error covariance after seeding
    pub const INITIAL_ERROR_COVARIANCE: f64 = 1.0;
}

/// Synthetic sensor model parameters
pub mod sensors {
    /// Full scale of a 16-bit ADC
    pub const ADC_MAX: f64 = 65535.0;
    /// Fraction of light removed at full cloud cover
    pub const CLOUD_ATTENUATION: f64 = 0.7;

    /// AS7262 channel magnitude at full intensity
    pub const SPECTRAL_SCALE: f64 = 100.0;
    /// AS7262 uniform noise half-width as a fraction of the value
    pub const SPECTRAL_NOISE: f64 = 0.05;
    /// AS7262 die self-heating with the indicator LED on (°C)
    pub const SPECTRAL_SELF_HEATING_C: f64 = 2.0;
    /// AS7262 temperature jitter half-width (°C)
    pub const SPECTRAL_TEMP_JITTER_C: f64 = 0.1;
    /// AS7262 gains the hardware accepts
    pub const SPECTRAL_GAINS: [f64; 4] = [1.0, 3.7, 16.0, 64.0];

    /// TSL2591 baseline IR-to-full ratio
    pub const LUMINANCE_BASE_IR_RATIO: f64 = 0.25;
    /// TSL2591 IR ratio swing over the day
    pub const LUMINANCE_IR_DAY_SWING: f64 = 0.1;
    /// TSL2591 uniform noise half-width as a fraction of the value
    pub const LUMINANCE_NOISE: f64 = 0.02;
    /// TSL2591 gains the hardware accepts
    pub const LUMINANCE_GAINS: [f64; 4] = [1.0, 25.0, 428.0, 9876.0];
    /// TSL2591 lux scale constant
    pub const LUX_DF: f64 = 408.0;
    /// TSL2591 channel 0 (full spectrum) coefficient
    pub const CH0_COEFF: f64 = 1.00;
    /// TSL2591 channel 1 (IR) coefficient
    pub const CH1_COEFF: f64 = 1.64;

    /// SEN0611 CCT swing over the day for daylight (K)
    pub const CCT_DAY_SWING_K: f64 = 1000.0;
    /// SEN0611 CCT increase at full cloud cover (K)
    pub const CCT_CLOUD_SHIFT_K: f64 = 500.0;
    /// SEN0611 reported CCT range
    pub const CCT_MIN_K: f64 = 1000.0;
    pub const CCT_MAX_K: f64 = 10000.0;
    /// SEN0611 light level below which accuracy degrades
    pub const LOW_LIGHT_INTENSITY: f64 = 0.1;
    /// SEN0611 accuracy multiplier in low light
    pub const LOW_LIGHT_ACCURACY_FACTOR: f64 = 0.7;
    /// SEN0611 accuracy multiplier in high-accuracy mode
    pub const HIGH_ACCURACY_FACTOR: f64 = 1.1;
    /// SEN0611 accuracy jitter half-width (percent)
    pub const ACCURACY_JITTER: f64 = 1.0;
    /// SEN0611 ALS reading at full daylight (lux)
    pub const ALS_FULL_DAYLIGHT_LUX: f64 = 100_000.0;
    /// SEN0611 ALS contribution of artificial light at full intensity (lux)
    pub const ALS_ARTIFICIAL_LUX: f64 = 1000.0;
    /// SEN0611 ALS uniform noise half-width as a fraction of the value
    pub const ALS_NOISE: f64 = 0.05;
}

/// Environment model evolution
pub mod environment {
    /// Hours added to the time of day per tick
    pub const TIME_STEP_HOURS: f64 = 0.1;
    /// Probability of a cloud cover change per tick
    pub const CLOUD_CHANGE_PROBABILITY: f64 = 0.1;
    /// Maximum cloud cover change per event, either direction
    pub const CLOUD_STEP: f64 = 0.1;
    /// Night-time baseline temperature (°C)
    pub const BASE_TEMPERATURE_C: f64 = 20.0;
    /// Temperature swing over the day (°C)
    pub const TEMPERATURE_SWING_C: f64 = 5.0;
    /// Standard deviation of the temperature jitter (°C)
    pub const TEMPERATURE_JITTER_C: f64 = 0.3;
}

/// Cross-sensor consistency thresholds
pub mod confidence {
    /// Luminance / spectral-sum ratio considered plausible
    pub const LUMINANCE_RATIO_MIN: f64 = 0.1;
    pub const LUMINANCE_RATIO_MAX: f64 = 10.0;
    /// Relative blue/red deviation tolerated against the expected ratio
    pub const BLUE_RED_TOLERANCE: f64 = 0.5;
    /// Penalty applied on a failed consistency check
    pub const PENALTY: f64 = 0.8;
    /// Floor for any confidence weight
    pub const FLOOR: f64 = 0.1;
    /// Residual threshold in filter standard deviations
    pub const OUTLIER_SIGMA: f64 = 3.0;
    /// Weight assigned to a luminance or CCT reading that leaves its recent track
    pub const SCALAR_OUTLIER_WEIGHT: f64 = 0.5;
}

/// Scheduling defaults
pub mod schedule {
    use std::time::Duration;

    /// Dashboard consumer tick period
    pub const DASHBOARD_INTERVAL: Duration = Duration::from_millis(500);
    /// Simulator producer tick period
    pub const SIMULATOR_INTERVAL: Duration = Duration::from_millis(1000);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cie_tables_have_six_channels() {
        assert_eq!(cie::X_COEFFICIENTS.len(), cie::WAVELENGTHS_NM.len());
        assert!(cie::Y_COEFFICIENTS.iter().all(|c| *c >= 0.0));
        assert!(cie::Z_COEFFICIENTS.iter().all(|c| *c >= 0.0));
    }

    #[test]
    fn test_ranges_are_ordered() {
        assert!(mccamy::MIN_CCT_K < mccamy::MAX_CCT_K);
        assert!(camera::MIN_TARGET_CCT_K < camera::DEFAULT_TARGET_CCT_K);
        assert!(camera::DEFAULT_TARGET_CCT_K < camera::MAX_TARGET_CCT_K);
        assert!(sensors::CCT_MIN_K < sensors::CCT_MAX_K);
        assert!(schedule::DASHBOARD_INTERVAL < schedule::SIMULATOR_INTERVAL);
    }
}
