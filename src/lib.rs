//! # colorsense
//!
//! A Rust crate for fusing multi-sensor light measurements into scene color
//! temperature and camera white balance settings.
//!
//! This library provides:
//! - Synthetic AS7262, TSL2591 and SEN0611 sensors driven by an evolving environment
//! - Per-channel noise filtering (moving average, median, exponential, Kalman)
//! - CIE XYZ, chromaticity, McCamy CCT and Duv tint from six spectral bands
//! - Camera white balance multipliers for a target CCT
//! - A periodic scheduler and recorded-data replay for dashboard sessions
//!
//! ## Example
//!
//! ```rust
//! use colorsense::{RawRow, Session, SpectralChannels};
//!
//! let mut session = Session::new();
//! let row = RawRow::from_channels(&SpectralChannels::new(34.2, 38.9, 54.5, 61.1, 57.5, 48.5));
//! let record = session.process_row(&row);
//! println!("CCT: {} K, tint: {:.2}", record.color_temperature_k, record.tint);
//! # assert_eq!(record.color_temperature_k, 3500.0);
//! ```

pub mod calibration;
pub mod color;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod scheduler;
pub mod sensors;
pub mod simulator;

pub use calibration::{CameraSettings, LightSource};
pub use color::{calculate_color_temperature, ColorResult, SpectralChannels};
pub use config::SessionConfig;
pub use environment::{EnvironmentModel, EnvironmentPatch, EnvironmentalConditions};
pub use error::{Result, SenseError};
pub use filter::{FilterStrategy, NoiseFilter};
pub use pipeline::{DashboardReplay, ProcessedRecord, RawRow, RecordSource, SensorConfidence, Session};
pub use scheduler::PeriodicTask;
pub use simulator::{Command, ControlMessage, SensorPatch, SensorRig, SimulatorFrame};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_record_serialization() {
        let mut session = Session::new();
        let row: RawRow = serde_json::from_str(
            r#"{"Timestamp": "2024-05-01T12:00:00Z",
                "Spectral_1": 34.2, "Spectral_2": 38.9, "Spectral_3": 54.5,
                "Spectral_4": 61.1, "Spectral_5": 57.5, "Spectral_6": 48.5,
                "Luminance": 300.0, "ALS": 290.0, "GPS_Valid": false}"#,
        )
        .unwrap();

        let record = session.process_row(&row);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["Timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["ColorTemperature_K"], 3500.0);
        assert_eq!(json["Spectral_3"], 54.5);
        assert_eq!(json["Luminance"], 300.0);
        assert_eq!(json["GPS_Valid"], false);
        assert!(json["Tint"].is_number());
        assert!(json["CameraSettings"]["rMultiplier"].is_number());
        assert!(json["CameraSettings"]["cctRatio"].is_number());
        assert!(json["Chromaticity"]["x"].is_number());
        assert!(json["Preview"].as_str().unwrap().starts_with('#'));
        assert!(json["Confidence"]["as7262"].is_number());
        assert!(json["FusedLuminance_lux"].is_number());
        assert!(json.get("spectral").is_none());
    }
}
