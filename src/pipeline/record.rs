//! Raw input rows and processed output records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::confidence::SensorConfidence;
use crate::calibration::CameraSettings;
use crate::color::{Chromaticity, SpectralChannels};

/// Nested spectral block, as sent by the simulator rig
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralBlock {
    #[serde(flatten)]
    pub channels: SpectralChannels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// One raw sensor reading row
///
/// Spectral data arrives either as flat `Spectral_1..6` columns (violet
/// first) or as a nested `spectral` block; the nested block wins when both
/// are present. Missing optional columns stay `None`; unknown columns land
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// ISO 8601 string or epoch number, passed through untouched
    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,

    #[serde(rename = "Spectral_1", default, skip_serializing_if = "Option::is_none")]
    pub spectral_1: Option<f64>,
    #[serde(rename = "Spectral_2", default, skip_serializing_if = "Option::is_none")]
    pub spectral_2: Option<f64>,
    #[serde(rename = "Spectral_3", default, skip_serializing_if = "Option::is_none")]
    pub spectral_3: Option<f64>,
    #[serde(rename = "Spectral_4", default, skip_serializing_if = "Option::is_none")]
    pub spectral_4: Option<f64>,
    #[serde(rename = "Spectral_5", default, skip_serializing_if = "Option::is_none")]
    pub spectral_5: Option<f64>,
    #[serde(rename = "Spectral_6", default, skip_serializing_if = "Option::is_none")]
    pub spectral_6: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral: Option<SpectralBlock>,

    /// Spectral sensor die temperature (°C) for flat rows
    #[serde(rename = "Temperature", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// TSL2591 lux
    #[serde(rename = "Luminance", default, skip_serializing_if = "Option::is_none")]
    pub luminance: Option<f64>,
    #[serde(rename = "IR", default, skip_serializing_if = "Option::is_none")]
    pub ir: Option<f64>,
    #[serde(rename = "Full", default, skip_serializing_if = "Option::is_none")]
    pub full: Option<f64>,

    /// SEN0611 ambient light (lux)
    #[serde(rename = "ALS", default, skip_serializing_if = "Option::is_none")]
    pub als: Option<f64>,
    /// SEN0611 CCT (K)
    #[serde(rename = "CCT", default, skip_serializing_if = "Option::is_none")]
    pub sensor_cct: Option<f64>,

    /// Satellite count; float because logged columns mix in NaN
    #[serde(rename = "Satellites", default, skip_serializing_if = "Option::is_none")]
    pub satellites: Option<f64>,
    #[serde(rename = "HDOP", default, skip_serializing_if = "Option::is_none")]
    pub hdop: Option<f64>,
    #[serde(rename = "GPS_Valid", default, skip_serializing_if = "Option::is_none")]
    pub gps_valid: Option<bool>,

    /// Columns not named above (position, validity flags, device clocks),
    /// passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRow {
    /// Build a flat row from spectral channels
    pub fn from_channels(channels: &SpectralChannels) -> Self {
        let mut row = Self::default();
        row.set_flat_channels(channels);
        row
    }

    /// Whether the row carries any spectral data at all
    pub fn has_spectral(&self) -> bool {
        self.spectral.is_some() || self.flat_channels().iter().any(Option::is_some)
    }

    /// Spectral channels; missing flat columns read as NaN
    pub fn spectral_channels(&self) -> SpectralChannels {
        if let Some(block) = &self.spectral {
            return block.channels;
        }
        SpectralChannels::from_array(self.flat_channels().map(|v| v.unwrap_or(f64::NAN)))
    }

    /// Spectral sensor temperature from the nested block or the flat column
    pub fn sensor_temperature(&self) -> Option<f64> {
        self.spectral
            .as_ref()
            .and_then(|block| block.temperature)
            .or(self.temperature)
    }

    /// Overwrite `Spectral_1..6`
    pub fn set_flat_channels(&mut self, channels: &SpectralChannels) {
        let [s1, s2, s3, s4, s5, s6] = channels.to_array();
        self.spectral_1 = Some(s1);
        self.spectral_2 = Some(s2);
        self.spectral_3 = Some(s3);
        self.spectral_4 = Some(s4);
        self.spectral_5 = Some(s5);
        self.spectral_6 = Some(s6);
    }

    fn flat_channels(&self) -> [Option<f64>; 6] {
        [
            self.spectral_1,
            self.spectral_2,
            self.spectral_3,
            self.spectral_4,
            self.spectral_5,
            self.spectral_6,
        ]
    }
}

/// One processed record, handed to dashboard consumers
///
/// Carries the raw row with `Spectral_1..6` replaced by filtered values,
/// plus the derived color fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRecord {
    #[serde(flatten)]
    pub row: RawRow,

    #[serde(rename = "ColorTemperature_K")]
    pub color_temperature_k: f64,

    #[serde(rename = "Tint")]
    pub tint: f64,

    #[serde(rename = "CameraSettings")]
    pub camera_settings: CameraSettings,

    #[serde(rename = "Chromaticity")]
    pub chromaticity: Chromaticity,

    /// Filtered spectral sensor temperature (°C)
    #[serde(rename = "SensorTemperature_C", skip_serializing_if = "Option::is_none")]
    pub sensor_temperature_c: Option<f64>,

    /// sRGB swatch of the measured light
    #[serde(rename = "Preview")]
    pub preview_hex: String,

    #[serde(rename = "Confidence")]
    pub confidence: SensorConfidence,

    /// Confidence-weighted blend of TSL2591 lux and SEN0611 ALS
    #[serde(rename = "FusedLuminance_lux", skip_serializing_if = "Option::is_none")]
    pub fused_luminance_lux: Option<f64>,
}

impl ProcessedRecord {
    /// Wire names of the derived fields; a raw column with one of these
    /// names is replaced by the derived value
    pub const DERIVED_FIELDS: [&'static str; 8] = [
        "ColorTemperature_K",
        "Tint",
        "CameraSettings",
        "Chromaticity",
        "SensorTemperature_C",
        "Preview",
        "Confidence",
        "FusedLuminance_lux",
    ];

    /// Filtered spectral channels
    pub fn filtered_channels(&self) -> SpectralChannels {
        SpectralChannels::from_array(self.row.flat_channels().map(|v| v.unwrap_or(0.0)))
    }
}
