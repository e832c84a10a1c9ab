//! AS7262 six-band spectral sensor model

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{add_relative_noise, gain_multiplier, SensorSimulator};
use crate::color::SpectralChannels;
use crate::constants::sensors;
use crate::environment::EnvironmentalConditions;

/// One AS7262 measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralReading {
    #[serde(flatten)]
    pub channels: SpectralChannels,
    /// Die temperature (°C)
    pub temperature: f64,
}

impl Default for SpectralReading {
    fn default() -> Self {
        Self {
            channels: SpectralChannels::default(),
            temperature: 25.0,
        }
    }
}

/// AS7262 configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct As7262Config {
    /// Analog gain; the hardware accepts 1, 3.7, 16 and 64
    pub gain: f64,
    /// Integration time in milliseconds
    pub integration_time: f64,
    /// Indicator LED drive current step (0-3)
    pub led_drive: u8,
    /// 0 off, 1 on, 2 on during measurement only
    pub led_mode: u8,
}

impl Default for As7262Config {
    fn default() -> Self {
        Self {
            gain: 1.0,
            integration_time: 100.0,
            led_drive: 0,
            led_mode: 0,
        }
    }
}

/// Partial AS7262 configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct As7262Patch {
    pub gain: Option<f64>,
    pub integration_time: Option<f64>,
    pub led_drive: Option<u8>,
    pub led_mode: Option<u8>,
}

/// Simulated AS7262
pub struct As7262 {
    config: As7262Config,
    last: SpectralReading,
    rng: StdRng,
}

impl As7262 {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            config: As7262Config::default(),
            last: SpectralReading::default(),
            rng,
        }
    }

    fn base_values(env: &EnvironmentalConditions) -> [f64; 6] {
        let profile = env.artificial_light.kind.illuminant().spectral_profile;
        let intensity = env.effective_intensity();
        profile.map(|p| p * intensity * sensors::SPECTRAL_SCALE)
    }

    fn die_temperature(&mut self, env: &EnvironmentalConditions) -> f64 {
        let self_heating = if self.config.led_mode > 0 {
            sensors::SPECTRAL_SELF_HEATING_C
        } else {
            0.0
        };
        let jitter = self
            .rng
            .gen_range(-sensors::SPECTRAL_TEMP_JITTER_C..=sensors::SPECTRAL_TEMP_JITTER_C);
        env.temperature + self_heating + jitter
    }
}

impl Default for As7262 {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSimulator for As7262 {
    type Config = As7262Config;
    type Patch = As7262Patch;
    type Reading = SpectralReading;

    fn configure(&mut self, patch: &As7262Patch) {
        if let Some(gain) = patch.gain {
            self.config.gain = gain;
        }
        if let Some(t) = patch.integration_time {
            self.config.integration_time = t;
        }
        if let Some(drive) = patch.led_drive {
            self.config.led_drive = drive;
        }
        if let Some(mode) = patch.led_mode {
            self.config.led_mode = mode;
        }
        log::debug!("AS7262 configured: {:?}", self.config);
    }

    fn measure(&mut self, env: &EnvironmentalConditions) -> SpectralReading {
        let gain = gain_multiplier(&sensors::SPECTRAL_GAINS, self.config.gain);

        let mut values = Self::base_values(env);
        for v in values.iter_mut() {
            let noisy = add_relative_noise(&mut self.rng, *v, sensors::SPECTRAL_NOISE).max(0.0);
            *v = (noisy * gain).min(sensors::ADC_MAX);
        }

        self.last = SpectralReading {
            channels: SpectralChannels::from_array(values),
            temperature: self.die_temperature(env),
        };
        self.last
    }

    fn last_measurement(&self) -> &SpectralReading {
        &self.last
    }

    fn config(&self) -> &As7262Config {
        &self.config
    }

    fn set_config(&mut self, config: As7262Config) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::LightSource;
    use crate::environment::ArtificialLight;

    fn noon() -> EnvironmentalConditions {
        EnvironmentalConditions {
            light_intensity: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_sunlight_is_flat_within_noise() {
        let mut sensor = As7262::with_seed(1);
        let reading = sensor.measure(&noon());
        for v in reading.channels.to_array() {
            assert!((95.0..=105.0).contains(&v), "channel {v}");
        }
    }

    #[test]
    fn test_incandescent_profile_rises_to_red() {
        let mut sensor = As7262::with_seed(2);
        let env = EnvironmentalConditions {
            light_intensity: 1.0,
            artificial_light: ArtificialLight {
                kind: LightSource::Incandescent,
                intensity: 1.0,
            },
            ..Default::default()
        };
        let reading = sensor.measure(&env);
        assert!(reading.channels.red > reading.channels.violet * 2.0);
    }

    #[test]
    fn test_clouds_attenuate() {
        let mut sensor = As7262::with_seed(3);
        let env = EnvironmentalConditions {
            light_intensity: 1.0,
            cloud_cover: 1.0,
            ..Default::default()
        };
        let reading = sensor.measure(&env);
        for v in reading.channels.to_array() {
            assert!((28.5..=31.5).contains(&v), "channel {v}");
        }
    }

    #[test]
    fn test_gain_and_saturation() {
        let mut sensor = As7262::with_seed(4);
        sensor.configure(&As7262Patch {
            gain: Some(64.0),
            ..Default::default()
        });
        let reading = sensor.measure(&noon());
        assert!(reading.channels.green > 6000.0);

        sensor.configure(&As7262Patch {
            gain: Some(5.0),
            ..Default::default()
        });
        let reading = sensor.measure(&noon());
        // unsupported gain falls back to 1x
        assert!(reading.channels.green < 106.0);
        assert_eq!(sensor.config().gain, 5.0);

        let mut bright = As7262::with_seed(4);
        bright.configure(&As7262Patch {
            gain: Some(64.0),
            ..Default::default()
        });
        let env = EnvironmentalConditions {
            light_intensity: 20.0,
            ..Default::default()
        };
        let reading = bright.measure(&env);
        assert_eq!(reading.channels.red, 65535.0);
    }

    #[test]
    fn test_darkness_reads_zero() {
        let mut sensor = As7262::with_seed(5);
        let env = EnvironmentalConditions {
            light_intensity: 0.0,
            ..Default::default()
        };
        assert_eq!(sensor.measure(&env).channels.total(), 0.0);
    }

    #[test]
    fn test_led_mode_heats_die() {
        let mut sensor = As7262::with_seed(6);
        let cold = sensor.measure(&noon()).temperature;
        assert!((cold - 25.0).abs() <= 0.1 + 1e-9);

        sensor.configure(&As7262Patch {
            led_mode: Some(1),
            ..Default::default()
        });
        let warm = sensor.measure(&noon()).temperature;
        assert!((warm - 27.0).abs() <= 0.1 + 1e-9);
    }

    #[test]
    fn test_last_measurement_tracks_measure() {
        let mut sensor = As7262::with_seed(7);
        assert_eq!(sensor.last_measurement().temperature, 25.0);
        let reading = sensor.measure(&noon());
        assert_eq!(sensor.last_measurement(), &reading);
    }

    #[test]
    fn test_reading_wire_shape() {
        let json = serde_json::to_value(SpectralReading::default()).unwrap();
        assert_eq!(json["violet"], 0.0);
        assert_eq!(json["temperature"], 25.0);
    }
}
