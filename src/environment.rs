//! Ambient conditions driving the synthetic sensors
//!
//! [`EnvironmentModel`] owns one [`EnvironmentalConditions`] value and
//! advances it once per simulator tick: the clock moves forward, cloud cover
//! random-walks and air temperature follows a daily sine curve.
//!
//! Scripted scenarios override fields through [`EnvironmentPatch`]; omitted
//! fields stay as they are.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::calibration::LightSource;
use crate::constants::{environment, sensors};

/// Artificial lamp in the scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtificialLight {
    #[serde(rename = "type")]
    pub kind: LightSource,
    /// Lamp intensity in [0, 1]
    pub intensity: f64,
}

/// Snapshot of the simulated surroundings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentalConditions {
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Daylight intensity in [0, 1]
    pub light_intensity: f64,
    /// Hour of day in [0, 24)
    pub time_of_day: f64,
    /// Cloud cover in [0, 1]
    pub cloud_cover: f64,
    pub artificial_light: ArtificialLight,
}

impl Default for EnvironmentalConditions {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 50.0,
            light_intensity: 0.8,
            time_of_day: 12.0,
            cloud_cover: 0.0,
            artificial_light: ArtificialLight::default(),
        }
    }
}

impl EnvironmentalConditions {
    /// Light intensity after cloud attenuation
    pub fn effective_intensity(&self) -> f64 {
        self.light_intensity * (1.0 - self.cloud_cover * sensors::CLOUD_ATTENUATION)
    }

    /// `sin(pi * hour / 24)`: 0 at midnight, 1 at noon
    pub fn daylight_phase(&self) -> f64 {
        (PI * self.time_of_day / 24.0).sin()
    }

    /// Merge the fields present in `patch`
    pub fn apply(&mut self, patch: &EnvironmentPatch) {
        if let Some(v) = patch.temperature {
            self.temperature = v;
        }
        if let Some(v) = patch.humidity {
            self.humidity = v;
        }
        if let Some(v) = patch.light_intensity {
            self.light_intensity = v;
        }
        if let Some(v) = patch.time_of_day {
            self.time_of_day = v;
        }
        if let Some(v) = patch.cloud_cover {
            self.cloud_cover = v;
        }
        if let Some(light) = &patch.artificial_light {
            if let Some(kind) = light.kind {
                self.artificial_light.kind = kind;
            }
            if let Some(intensity) = light.intensity {
                self.artificial_light.intensity = intensity;
            }
        }
    }
}

/// Partial artificial light override
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtificialLightPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<LightSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
}

/// Partial environment override; `None` leaves a field unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artificial_light: Option<ArtificialLightPatch>,
}

/// Time-varying environment with its own random source
pub struct EnvironmentModel {
    conditions: EnvironmentalConditions,
    initial: EnvironmentalConditions,
    rng: StdRng,
}

impl EnvironmentModel {
    /// Create a model starting from `initial`, seeded from OS entropy
    pub fn new(initial: EnvironmentalConditions) -> Self {
        Self::from_rng(initial, StdRng::from_entropy())
    }

    /// Create a model with a fixed seed for reproducible runs
    pub fn with_seed(initial: EnvironmentalConditions, seed: u64) -> Self {
        Self::from_rng(initial, StdRng::seed_from_u64(seed))
    }

    fn from_rng(initial: EnvironmentalConditions, rng: StdRng) -> Self {
        Self {
            conditions: initial,
            initial,
            rng,
        }
    }

    /// Current conditions
    pub fn conditions(&self) -> &EnvironmentalConditions {
        &self.conditions
    }

    /// Advance one simulation step
    pub fn tick(&mut self) {
        let env = &mut self.conditions;
        env.time_of_day = (env.time_of_day + environment::TIME_STEP_HOURS).rem_euclid(24.0);

        if self.rng.gen_bool(environment::CLOUD_CHANGE_PROBABILITY) {
            let delta = self
                .rng
                .gen_range(-environment::CLOUD_STEP..=environment::CLOUD_STEP);
            env.cloud_cover = (env.cloud_cover + delta).clamp(0.0, 1.0);
        }

        let jitter: f64 = self.rng.sample(StandardNormal);
        env.temperature = environment::BASE_TEMPERATURE_C
            + env.daylight_phase() * environment::TEMPERATURE_SWING_C
            + jitter * environment::TEMPERATURE_JITTER_C;
    }

    /// Merge a scripted override into the current conditions
    pub fn set_environment(&mut self, patch: &EnvironmentPatch) {
        self.conditions.apply(patch);
        log::info!("Environment override applied: {:?}", patch);
    }

    /// Restore the conditions the model was created with
    pub fn reset(&mut self) {
        self.conditions = self.initial;
        log::info!("Environment reset to initial conditions");
    }
}

impl Default for EnvironmentModel {
    fn default() -> Self {
        Self::new(EnvironmentalConditions::default())
    }
}
