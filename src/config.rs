//! Configuration structures for a colorsense session.
//!
//! This module gathers every tunable parameter of the pipeline and the
//! simulator rig into one serializable value, organised by concern.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use colorsense::SessionConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = SessionConfig::from_json_file(Path::new("session.json"))?;
//!
//! // Or use defaults
//! let config = SessionConfig::default();
//! # Ok::<(), colorsense::SenseError>(())
//! ```
//!
//! Missing fields in a file fall back to their defaults.
//!
//! # Configuration Sections
//!
//! - [`FilterConfig`]: noise filter strategy and tuning
//! - [`CameraConfig`]: white balance target
//! - [`ScheduleConfig`]: tick periods
//! - [`SimulationConfig`]: RNG seed, initial environment, sensor settings

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{camera, filtering, schedule};
use crate::environment::EnvironmentalConditions;
use crate::filter::{FilterParams, FilterStrategy};
use crate::sensors::{As7262Config, Sen0611Config, Tsl2591Config};
use crate::{Result, SenseError};

/// Complete session configuration.
///
/// Serialized to/from JSON so runs can be reproduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Noise filter configuration
    pub filter: FilterConfig,

    /// Camera white balance configuration
    pub camera: CameraConfig,

    /// Tick periods for the dashboard and the simulator
    pub schedule: ScheduleConfig,

    /// Simulator rig configuration
    pub simulation: SimulationConfig,
}

/// Noise filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Strategy applied to every spectral channel
    pub strategy: FilterStrategy,

    /// History length for moving average and median
    pub window_size: usize,

    /// Exponential smoothing factor in (0, 1]
    pub alpha: f64,

    /// Kalman process noise
    pub process_noise: f64,

    /// Kalman measurement noise
    pub measurement_noise: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            strategy: FilterStrategy::default(),
            window_size: filtering::DEFAULT_WINDOW_SIZE,
            alpha: filtering::DEFAULT_ALPHA,
            process_noise: filtering::DEFAULT_PROCESS_NOISE,
            measurement_noise: filtering::DEFAULT_MEASUREMENT_NOISE,
        }
    }
}

impl FilterConfig {
    /// Filter tuning without the strategy
    pub fn params(&self) -> FilterParams {
        FilterParams {
            window_size: self.window_size,
            alpha: self.alpha,
            process_noise: self.process_noise,
            measurement_noise: self.measurement_noise,
        }
    }
}

/// Camera white balance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// White balance target in Kelvin, within [2000, 10000]
    pub target_cct: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target_cct: camera::DEFAULT_TARGET_CCT_K,
        }
    }
}

/// Tick periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Dashboard consumer period in milliseconds
    pub dashboard_interval_ms: u64,

    /// Simulator producer period in milliseconds
    pub simulator_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            dashboard_interval_ms: schedule::DASHBOARD_INTERVAL.as_millis() as u64,
            simulator_interval_ms: schedule::SIMULATOR_INTERVAL.as_millis() as u64,
        }
    }
}

impl ScheduleConfig {
    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_millis(self.dashboard_interval_ms)
    }

    pub fn simulator_interval(&self) -> Duration {
        Duration::from_millis(self.simulator_interval_ms)
    }
}

/// Simulator rig parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,

    /// Conditions at start and after a reset
    pub environment: EnvironmentalConditions,

    /// AS7262 settings
    pub as7262: As7262Config,

    /// TSL2591 settings
    pub tsl2591: Tsl2591Config,

    /// SEN0611 settings
    pub sen0611: Sen0611Config,
}

impl SessionConfig {
    /// Check values the session would otherwise reject at runtime
    ///
    /// Sensor settings are not validated; simulators fall back to defaults
    /// for unsupported values.
    pub fn validate(&self) -> Result<()> {
        let target = self.camera.target_cct;
        if !(camera::MIN_TARGET_CCT_K..=camera::MAX_TARGET_CCT_K).contains(&target) {
            return Err(SenseError::InvalidParameter {
                parameter: "camera.target_cct".to_string(),
                value: format!("{} K", target),
            });
        }
        if self.filter.window_size == 0 {
            return Err(SenseError::InvalidParameter {
                parameter: "filter.window_size".to_string(),
                value: "0".to_string(),
            });
        }
        if !(self.filter.alpha > 0.0 && self.filter.alpha <= 1.0) {
            return Err(SenseError::InvalidParameter {
                parameter: "filter.alpha".to_string(),
                value: self.filter.alpha.to_string(),
            });
        }
        if self.schedule.dashboard_interval_ms == 0 || self.schedule.simulator_interval_ms == 0 {
            return Err(SenseError::InvalidParameter {
                parameter: "schedule".to_string(),
                value: "0 ms".to_string(),
            });
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SenseError::config_load(format!("cannot read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SenseError::config_load(format!("cannot parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SenseError::config_load("cannot serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            SenseError::config_load(format!("cannot write {}", path.display()), e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.filter.strategy, FilterStrategy::Kalman);
        assert_eq!(config.filter.window_size, 10);
        assert_eq!(config.camera.target_cct, 5600.0);
        assert_eq!(config.schedule.dashboard_interval(), Duration::from_millis(500));
        assert_eq!(config.schedule.simulator_interval(), Duration::from_millis(1000));
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.simulation.sen0611.threshold, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut config = SessionConfig::default();
        config.filter.strategy = FilterStrategy::Median;
        config.simulation.seed = Some(99);
        config.to_json_file(&path).unwrap();

        let loaded = SessionConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(
            &path,
            r#"{"camera": {"target_cct": 3200}, "simulation": {"as7262": {"gain": 16}}}"#,
        )
        .unwrap();

        let config = SessionConfig::from_json_file(&path).unwrap();
        assert_eq!(config.camera.target_cct, 3200.0);
        assert_eq!(config.simulation.as7262.gain, 16.0);
        assert_eq!(config.simulation.as7262.integration_time, 100.0);
        assert_eq!(config.filter.window_size, 10);
    }

    #[test]
    fn test_out_of_range_target_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"camera": {"target_cct": 12000}}"#).unwrap();

        let err = SessionConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, SenseError::InvalidParameter { .. }));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        let err = SessionConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SenseError::ConfigLoad { .. }));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = SessionConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, SenseError::ConfigLoad { .. }));
    }

    #[test]
    fn test_validate_filter() {
        let mut config = SessionConfig::default();
        config.filter.alpha = 0.0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.filter.window_size = 0;
        assert!(config.validate().is_err());
    }
}
