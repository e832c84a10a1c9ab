//! Synthetic sensor models
//!
//! Each simulator maps the current [`EnvironmentalConditions`] to one noisy
//! reading shaped like its hardware counterpart:
//!
//! - [`spectral::As7262`]: six-band spectral sensor
//! - [`luminance::Tsl2591`]: full-spectrum / IR light sensor with lux
//! - [`cct::Sen0611`]: CCT meter with ambient light output
//!
//! Simulators never fail. Unsupported configuration values (an unknown gain
//! or mode) fall back to their documented defaults.

pub mod cct;
pub mod luminance;
pub mod spectral;

pub use cct::{CctReading, Sen0611, Sen0611Config, Sen0611Patch};
pub use luminance::{calculate_lux, LuminanceReading, Tsl2591, Tsl2591Config, Tsl2591Patch};
pub use spectral::{As7262, As7262Config, As7262Patch, SpectralReading};

use rand::Rng;

use crate::environment::EnvironmentalConditions;

/// Common interface of the simulated sensors
pub trait SensorSimulator {
    /// Full configuration
    type Config;
    /// Partial configuration update
    type Patch;
    /// One measurement
    type Reading: Clone;

    /// Merge the fields present in `patch` into the configuration
    fn configure(&mut self, patch: &Self::Patch);

    /// Take one measurement of the given environment
    fn measure(&mut self, env: &EnvironmentalConditions) -> Self::Reading;

    /// Most recent measurement (or the power-on value)
    fn last_measurement(&self) -> &Self::Reading;

    fn config(&self) -> &Self::Config;

    /// Replace the whole configuration
    fn set_config(&mut self, config: Self::Config);
}

/// Look up a gain multiplier, defaulting to 1 for unsupported values
pub(crate) fn gain_multiplier(supported: &[f64], gain: f64) -> f64 {
    supported
        .iter()
        .copied()
        .find(|g| (g - gain).abs() < 1e-9)
        .unwrap_or(1.0)
}

/// Add uniform noise of up to `±fraction * value`
pub(crate) fn add_relative_noise<R: Rng>(rng: &mut R, value: f64, fraction: f64) -> f64 {
    value + rng.gen_range(-fraction..=fraction) * value
}
