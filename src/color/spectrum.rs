//! Six-channel spectral sample
//!
//! The AS7262 reports six bands; the color engine and the noise filter both
//! address them by position (violet first) or by wavelength key.

use serde::{Deserialize, Serialize};

use crate::constants::cie;

/// Filter keys for the spectral channels, violet first
pub const CHANNEL_KEYS: [&str; 6] = [
    "spectral_450nm",
    "spectral_500nm",
    "spectral_550nm",
    "spectral_570nm",
    "spectral_600nm",
    "spectral_650nm",
];

/// Filter key for the spectral sensor die temperature
pub const TEMPERATURE_KEY: &str = "spectral_temperature";

/// Intensities of the six AS7262 bands
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralChannels {
    /// 450 nm
    pub violet: f64,
    /// 500 nm
    pub blue: f64,
    /// 550 nm
    pub green: f64,
    /// 570 nm
    pub yellow: f64,
    /// 600 nm
    pub orange: f64,
    /// 650 nm
    pub red: f64,
}

impl SpectralChannels {
    pub fn new(violet: f64, blue: f64, green: f64, yellow: f64, orange: f64, red: f64) -> Self {
        Self {
            violet,
            blue,
            green,
            yellow,
            orange,
            red,
        }
    }

    /// Build from an array ordered violet..red
    pub fn from_array(values: [f64; 6]) -> Self {
        let [violet, blue, green, yellow, orange, red] = values;
        Self::new(violet, blue, green, yellow, orange, red)
    }

    /// Channel values ordered violet..red
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.violet,
            self.blue,
            self.green,
            self.yellow,
            self.orange,
            self.red,
        ]
    }

    /// Sum of all channels
    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Copy with negative and non-finite channels replaced by zero
    pub fn sanitized(&self) -> Self {
        let mut values = self.to_array();
        for v in values.iter_mut() {
            if !v.is_finite() || *v < 0.0 {
                *v = 0.0;
            }
        }
        Self::from_array(values)
    }

    /// Iterate `(wavelength_nm, value)` pairs
    pub fn bands(&self) -> impl Iterator<Item = (u32, f64)> {
        cie::WAVELENGTHS_NM.into_iter().zip(self.to_array())
    }
}
