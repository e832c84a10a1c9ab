//! SEN0611 CCT meter and ambient light sensor model

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{add_relative_noise, SensorSimulator};
use crate::constants::sensors;
use crate::environment::EnvironmentalConditions;

/// Mode value selecting high-accuracy measurement
pub const HIGH_ACCURACY_MODE: u8 = 1;

/// One SEN0611 measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CctReading {
    /// Correlated color temperature in Kelvin, in [1000, 10000]
    pub cct: f64,
    /// Ambient light in lux, two decimals
    pub als: f64,
    /// Measurement confidence in percent
    pub accuracy: f64,
}

impl Default for CctReading {
    fn default() -> Self {
        Self {
            cct: 5500.0,
            als: 0.0,
            accuracy: 100.0,
        }
    }
}

/// SEN0611 configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sen0611Config {
    /// 0 normal, 1 high accuracy; other values behave as normal
    pub mode: u8,
    /// ALS readings below this many lux report 0
    pub threshold: f64,
}

impl Default for Sen0611Config {
    fn default() -> Self {
        Self {
            mode: 0,
            threshold: 10.0,
        }
    }
}

/// Partial SEN0611 configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sen0611Patch {
    pub mode: Option<u8>,
    pub threshold: Option<f64>,
}

/// Simulated SEN0611
pub struct Sen0611 {
    config: Sen0611Config,
    last: CctReading,
    rng: StdRng,
}

impl Sen0611 {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            config: Sen0611Config::default(),
            last: CctReading::default(),
            rng,
        }
    }

    fn simulate_cct(&mut self, env: &EnvironmentalConditions) -> (f64, f64) {
        let light = env.artificial_light.kind;
        let source = light.illuminant();

        let mut base_cct = source.base_cct_k;
        if !light.is_artificial() {
            base_cct += env.daylight_phase() * sensors::CCT_DAY_SWING_K;
        }
        base_cct += env.cloud_cover * sensors::CCT_CLOUD_SHIFT_K;

        let variation = self
            .rng
            .gen_range(-source.cct_variation_k..=source.cct_variation_k);
        let cct = (base_cct + variation).clamp(sensors::CCT_MIN_K, sensors::CCT_MAX_K);

        let mut accuracy = source.base_accuracy;
        if env.light_intensity < sensors::LOW_LIGHT_INTENSITY {
            accuracy *= sensors::LOW_LIGHT_ACCURACY_FACTOR;
        }
        if self.config.mode == HIGH_ACCURACY_MODE {
            accuracy = (accuracy * sensors::HIGH_ACCURACY_FACTOR).min(100.0);
        }
        accuracy += self
            .rng
            .gen_range(-sensors::ACCURACY_JITTER..=sensors::ACCURACY_JITTER);
        let accuracy = accuracy.clamp(0.0, 100.0);

        (cct.round(), accuracy.round())
    }

    fn simulate_als(&mut self, env: &EnvironmentalConditions) -> f64 {
        let mut als = env.effective_intensity() * sensors::ALS_FULL_DAYLIGHT_LUX;
        if env.artificial_light.kind.is_artificial() {
            als += env.artificial_light.intensity * sensors::ALS_ARTIFICIAL_LUX;
        }

        let als = add_relative_noise(&mut self.rng, als, sensors::ALS_NOISE).max(0.0);
        if als < self.config.threshold {
            return 0.0;
        }
        (als * 100.0).round() / 100.0
    }
}

impl Default for Sen0611 {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSimulator for Sen0611 {
    type Config = Sen0611Config;
    type Patch = Sen0611Patch;
    type Reading = CctReading;

    fn configure(&mut self, patch: &Sen0611Patch) {
        if let Some(mode) = patch.mode {
            self.config.mode = mode;
        }
        if let Some(threshold) = patch.threshold {
            self.config.threshold = threshold;
        }
        log::debug!("SEN0611 configured: {:?}", self.config);
    }

    fn measure(&mut self, env: &EnvironmentalConditions) -> CctReading {
        let (cct, accuracy) = self.simulate_cct(env);
        let als = self.simulate_als(env);
        self.last = CctReading { cct, als, accuracy };
        self.last
    }

    fn last_measurement(&self) -> &CctReading {
        &self.last
    }

    fn config(&self) -> &Sen0611Config {
        &self.config
    }

    fn set_config(&mut self, config: Sen0611Config) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::LightSource;
    use crate::environment::ArtificialLight;

    fn lamp(kind: LightSource) -> EnvironmentalConditions {
        EnvironmentalConditions {
            artificial_light: ArtificialLight {
                kind,
                intensity: 1.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_daylight_cct_swings_with_sun() {
        let mut sensor = Sen0611::with_seed(1);
        // noon: 5500 + 1000 +- 500
        for _ in 0..200 {
            let cct = sensor.measure(&EnvironmentalConditions::default()).cct;
            assert!((6000.0..=7000.0).contains(&cct), "cct {cct}");
        }
    }

    #[test]
    fn test_incandescent_cct_is_warm() {
        let mut sensor = Sen0611::with_seed(2);
        for _ in 0..200 {
            let cct = sensor.measure(&lamp(LightSource::Incandescent)).cct;
            assert!((2500.0..=2900.0).contains(&cct), "cct {cct}");
        }
    }

    #[test]
    fn test_cct_is_clamped_and_integral() {
        let mut sensor = Sen0611::with_seed(3);
        let env = EnvironmentalConditions {
            cloud_cover: 1.0,
            ..lamp(LightSource::Led)
        };
        for _ in 0..200 {
            let reading = sensor.measure(&env);
            assert!((1000.0..=10000.0).contains(&reading.cct));
            assert_eq!(reading.cct, reading.cct.round());
        }
    }

    #[test]
    fn test_low_light_degrades_accuracy() {
        let mut sensor = Sen0611::with_seed(4);
        let dim = EnvironmentalConditions {
            light_intensity: 0.05,
            ..Default::default()
        };
        // 95 * 0.7 = 66.5 +- 1
        let accuracy = sensor.measure(&dim).accuracy;
        assert!((65.0..=68.0).contains(&accuracy), "accuracy {accuracy}");
    }

    #[test]
    fn test_high_accuracy_mode_caps_at_100() {
        let mut sensor = Sen0611::with_seed(5);
        sensor.configure(&Sen0611Patch {
            mode: Some(1),
            ..Default::default()
        });
        for _ in 0..100 {
            let accuracy = sensor.measure(&EnvironmentalConditions::default()).accuracy;
            assert!((99.0..=100.0).contains(&accuracy), "accuracy {accuracy}");
        }
    }

    #[test]
    fn test_unknown_mode_behaves_normally() {
        let mut sensor = Sen0611::with_seed(6);
        sensor.configure(&Sen0611Patch {
            mode: Some(7),
            ..Default::default()
        });
        let accuracy = sensor.measure(&lamp(LightSource::Fluorescent)).accuracy;
        assert!((84.0..=86.0).contains(&accuracy));
    }

    #[test]
    fn test_als_scales_with_daylight() {
        let mut sensor = Sen0611::with_seed(7);
        let als = sensor.measure(&EnvironmentalConditions::default()).als;
        // 0.8 * 100000 +- 5%
        assert!((76_000.0..=84_000.0).contains(&als));
        assert_eq!(als, (als * 100.0).round() / 100.0);
    }

    #[test]
    fn test_als_threshold_zeroes_dim_readings() {
        let mut sensor = Sen0611::with_seed(8);
        let env = EnvironmentalConditions {
            light_intensity: 0.00005,
            ..Default::default()
        };
        // ~5 lux, under the default 10 lux threshold
        assert_eq!(sensor.measure(&env).als, 0.0);

        sensor.configure(&Sen0611Patch {
            threshold: Some(1.0),
            ..Default::default()
        });
        assert!(sensor.measure(&env).als > 0.0);
    }

    #[test]
    fn test_artificial_light_adds_als() {
        let mut sensor = Sen0611::with_seed(9);
        let env = EnvironmentalConditions {
            light_intensity: 0.0,
            ..lamp(LightSource::Led)
        };
        let als = sensor.measure(&env).als;
        assert!((950.0..=1050.0).contains(&als));
    }
}
