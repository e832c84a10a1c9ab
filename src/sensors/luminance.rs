//! TSL2591 full-spectrum / IR light sensor model

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{add_relative_noise, gain_multiplier, SensorSimulator};
use crate::constants::sensors;
use crate::environment::EnvironmentalConditions;

/// One TSL2591 measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LuminanceReading {
    /// Full minus IR
    pub visible: f64,
    /// Channel 1 counts
    pub ir: f64,
    /// Channel 0 counts
    pub full: f64,
    /// Derived illuminance
    pub lux: f64,
}

/// TSL2591 configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tsl2591Config {
    /// Analog gain; the hardware accepts 1, 25, 428 and 9876
    pub gain: f64,
    /// Integration time in milliseconds
    pub integration_time: f64,
    /// When false, measurements repeat the last reading
    pub enabled: bool,
}

impl Default for Tsl2591Config {
    fn default() -> Self {
        Self {
            gain: 1.0,
            integration_time: 100.0,
            enabled: true,
        }
    }
}

/// Partial TSL2591 configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tsl2591Patch {
    pub gain: Option<f64>,
    pub integration_time: Option<f64>,
    pub enabled: Option<bool>,
}

/// TSL2591 lux from raw channel counts
///
/// Uses the datasheet's piecewise fit over `ratio = ch1·1.64 / ch0·1.00`.
/// Returns 0 when there is no full-spectrum signal, when IR dominates
/// (`ch0·1.00 < ch1·1.64`) or when the ratio exceeds 1.30.
pub fn calculate_lux(ch0: f64, ch1: f64) -> f64 {
    if ch0 == 0.0 || !ch0.is_finite() || !ch1.is_finite() {
        return 0.0;
    }

    let c0 = ch0 * sensors::CH0_COEFF;
    let c1 = ch1 * sensors::CH1_COEFF;
    if c0 < c1 {
        return 0.0;
    }

    let ratio = c1 / c0;
    let lux = if ratio <= 0.50 {
        0.0304 * c0 - 0.062 * c0 * ratio.powf(1.4)
    } else if ratio <= 0.61 {
        0.0224 * c0 - 0.031 * c1
    } else if ratio <= 0.80 {
        0.0128 * c0 - 0.0153 * c1
    } else if ratio <= 1.30 {
        0.00146 * c0 - 0.00112 * c1
    } else {
        0.0
    };

    (lux * sensors::LUX_DF).max(0.0)
}

/// Simulated TSL2591
pub struct Tsl2591 {
    config: Tsl2591Config,
    last: LuminanceReading,
    rng: StdRng,
}

impl Tsl2591 {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            config: Tsl2591Config::default(),
            last: LuminanceReading::default(),
            rng,
        }
    }

    /// Noise-free channel counts before gain
    fn raw_channels(env: &EnvironmentalConditions) -> (f64, f64) {
        let ch0 = env.effective_intensity() * sensors::ADC_MAX;
        let base_ratio = if env.artificial_light.kind.is_artificial() {
            env.artificial_light.kind.illuminant().ir_ratio
        } else {
            sensors::LUMINANCE_BASE_IR_RATIO
        };
        let ir_ratio = base_ratio + env.daylight_phase() * sensors::LUMINANCE_IR_DAY_SWING;
        (ch0, ch0 * ir_ratio)
    }

    fn noisy(&mut self, value: f64) -> f64 {
        add_relative_noise(&mut self.rng, value, sensors::LUMINANCE_NOISE).clamp(0.0, sensors::ADC_MAX)
    }
}

impl Default for Tsl2591 {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSimulator for Tsl2591 {
    type Config = Tsl2591Config;
    type Patch = Tsl2591Patch;
    type Reading = LuminanceReading;

    fn configure(&mut self, patch: &Tsl2591Patch) {
        if let Some(gain) = patch.gain {
            self.config.gain = gain;
        }
        if let Some(t) = patch.integration_time {
            self.config.integration_time = t;
        }
        if let Some(enabled) = patch.enabled {
            self.config.enabled = enabled;
        }
        log::debug!("TSL2591 configured: {:?}", self.config);
    }

    fn measure(&mut self, env: &EnvironmentalConditions) -> LuminanceReading {
        if !self.config.enabled {
            return self.last;
        }

        let gain = gain_multiplier(&sensors::LUMINANCE_GAINS, self.config.gain);
        let (ch0, ch1) = Self::raw_channels(env);
        let full = self.noisy((ch0 * gain).min(sensors::ADC_MAX));
        let ir = self.noisy((ch1 * gain).min(sensors::ADC_MAX));

        self.last = LuminanceReading {
            visible: (full - ir).max(0.0),
            ir,
            full,
            lux: calculate_lux(full, ir),
        };
        self.last
    }

    fn last_measurement(&self) -> &LuminanceReading {
        &self.last
    }

    fn config(&self) -> &Tsl2591Config {
        &self.config
    }

    fn set_config(&mut self, config: Tsl2591Config) {
        self.config = config;
    }
}
