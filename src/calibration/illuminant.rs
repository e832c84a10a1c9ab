//! Light-source characteristics
//!
//! One table per illuminant family holding everything the sensor models
//! need: the relative spectral distribution over the six AS7262 channels,
//! the nominal CCT reported by a CCT meter, and the IR fraction seen by
//! a broadband photodiode.

use serde::{Deserialize, Serialize};

/// Artificial light type present in the scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightSource {
    /// Daylight only
    #[default]
    None,
    /// Tungsten filament
    Incandescent,
    /// Tube or compact fluorescent
    Fluorescent,
    /// White LED
    Led,
}

/// Illuminant characteristics used by the sensor models
#[derive(Debug, Clone, PartialEq)]
pub struct Illuminant {
    /// Short identifier for logs
    pub name: &'static str,
    /// Relative intensity per AS7262 channel (violet..red)
    pub spectral_profile: [f64; 6],
    /// Nominal correlated color temperature in Kelvin
    pub base_cct_k: f64,
    /// Half-width of the random CCT spread in Kelvin
    pub cct_variation_k: f64,
    /// Base SEN0611 accuracy in percent
    pub base_accuracy: f64,
    /// IR share of the full-spectrum channel
    pub ir_ratio: f64,
}

/// Natural daylight, flat over the sensor's band
pub const SUNLIGHT: Illuminant = Illuminant {
    name: "sunlight",
    spectral_profile: [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    base_cct_k: 5500.0,
    cct_variation_k: 500.0,
    base_accuracy: 95.0,
    ir_ratio: 0.25,
};

/// Warm filament lamp, rising towards red
pub const INCANDESCENT: Illuminant = Illuminant {
    name: "incandescent",
    spectral_profile: [0.3, 0.5, 0.7, 0.9, 1.0, 1.0],
    base_cct_k: 2700.0,
    cct_variation_k: 200.0,
    base_accuracy: 90.0,
    ir_ratio: 0.40,
};

/// Fluorescent tube, blue-green heavy
pub const FLUORESCENT: Illuminant = Illuminant {
    name: "fluorescent",
    spectral_profile: [0.8, 1.0, 0.9, 0.7, 0.5, 0.4],
    base_cct_k: 4000.0,
    cct_variation_k: 300.0,
    base_accuracy: 85.0,
    ir_ratio: 0.20,
};

/// Cool white LED
pub const LED: Illuminant = Illuminant {
    name: "led",
    spectral_profile: [0.9, 1.0, 0.8, 0.6, 0.5, 0.4],
    base_cct_k: 6500.0,
    cct_variation_k: 400.0,
    base_accuracy: 92.0,
    ir_ratio: 0.15,
};

impl LightSource {
    /// Illuminant driving the sensors; daylight when no lamp is present
    pub fn illuminant(&self) -> &'static Illuminant {
        match self {
            LightSource::None => &SUNLIGHT,
            LightSource::Incandescent => &INCANDESCENT,
            LightSource::Fluorescent => &FLUORESCENT,
            LightSource::Led => &LED,
        }
    }

    /// Whether an artificial lamp contributes to the scene
    pub fn is_artificial(&self) -> bool {
        !matches!(self, LightSource::None)
    }
}
