//! Simulated sensor rig
//!
//! [`SensorRig`] ties the environment model to the three sensor simulators
//! and produces one [`SimulatorFrame`] per step. Scripted scenarios and
//! dashboards steer it with JSON [`ControlMessage`]s:
//!
//! ```json
//! {"sensor": "as7262", "data": {"gain": 16}}
//! {"command": "setEnvironment", "environment": {"cloudCover": 0.4}}
//! {"command": "reset"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SimulationConfig;
use crate::environment::{EnvironmentModel, EnvironmentPatch, EnvironmentalConditions};
use crate::pipeline::RawRow;
use crate::sensors::{
    As7262, As7262Patch, CctReading, LuminanceReading, Sen0611, Sen0611Patch, SensorSimulator,
    SpectralReading, Tsl2591, Tsl2591Patch,
};
use crate::{Result, SenseError};

/// Partial configuration addressed to one sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sensor", content = "data", rename_all = "lowercase")]
pub enum SensorPatch {
    As7262(As7262Patch),
    Tsl2591(Tsl2591Patch),
    Sen0611(Sen0611Patch),
}

/// Environment command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Merge an environment override
    SetEnvironment {
        #[serde(default)]
        environment: EnvironmentPatch,
    },
    /// Restore the initial environment
    Reset,
}

/// Any message the rig accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlMessage {
    Config(SensorPatch),
    Command(Command),
}

impl From<SensorPatch> for ControlMessage {
    fn from(patch: SensorPatch) -> Self {
        ControlMessage::Config(patch)
    }
}

impl From<Command> for ControlMessage {
    fn from(command: Command) -> Self {
        ControlMessage::Command(command)
    }
}

/// One broadcast from the rig
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatorFrame {
    pub timestamp: DateTime<Utc>,
    pub as7262: SpectralReading,
    pub tsl2591: LuminanceReading,
    pub sen0611: CctReading,
    pub environment: EnvironmentalConditions,
}

impl SimulatorFrame {
    /// Flatten into the raw row shape the pipeline consumes
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::from_channels(&self.as7262.channels);
        row.timestamp = Some(Value::String(self.timestamp.to_rfc3339()));
        row.temperature = Some(self.as7262.temperature);
        row.luminance = Some(self.tsl2591.lux);
        row.ir = Some(self.tsl2591.ir);
        row.full = Some(self.tsl2591.full);
        row.als = Some(self.sen0611.als);
        row.sensor_cct = Some(self.sen0611.cct);
        row
    }
}

/// Environment model plus the three simulated sensors
pub struct SensorRig {
    environment: EnvironmentModel,
    as7262: As7262,
    tsl2591: Tsl2591,
    sen0611: Sen0611,
}

impl SensorRig {
    /// Build a rig from configuration
    ///
    /// With a seed, each component draws from its own stream derived from
    /// it, so two rigs with the same seed produce the same frames.
    pub fn new(config: &SimulationConfig) -> Self {
        let mut rig = match config.seed {
            Some(seed) => Self {
                environment: EnvironmentModel::with_seed(config.environment, seed),
                as7262: As7262::with_seed(seed.wrapping_add(1)),
                tsl2591: Tsl2591::with_seed(seed.wrapping_add(2)),
                sen0611: Sen0611::with_seed(seed.wrapping_add(3)),
            },
            None => Self {
                environment: EnvironmentModel::new(config.environment),
                as7262: As7262::new(),
                tsl2591: Tsl2591::new(),
                sen0611: Sen0611::new(),
            },
        };
        rig.as7262.set_config(config.as7262);
        rig.tsl2591.set_config(config.tsl2591);
        rig.sen0611.set_config(config.sen0611);
        rig
    }

    /// Advance the environment, then measure with every sensor
    pub fn step(&mut self) -> SimulatorFrame {
        self.environment.tick();
        let env = *self.environment.conditions();

        SimulatorFrame {
            timestamp: Utc::now(),
            as7262: self.as7262.measure(&env),
            tsl2591: self.tsl2591.measure(&env),
            sen0611: self.sen0611.measure(&env),
            environment: env,
        }
    }

    pub fn handle_message(&mut self, message: &ControlMessage) {
        match message {
            ControlMessage::Config(SensorPatch::As7262(patch)) => self.as7262.configure(patch),
            ControlMessage::Config(SensorPatch::Tsl2591(patch)) => self.tsl2591.configure(patch),
            ControlMessage::Config(SensorPatch::Sen0611(patch)) => self.sen0611.configure(patch),
            ControlMessage::Command(Command::SetEnvironment { environment }) => {
                self.environment.set_environment(environment)
            }
            ControlMessage::Command(Command::Reset) => self.environment.reset(),
        }
    }

    /// Decode and apply a JSON control message
    ///
    /// # Errors
    ///
    /// `MalformedMessage` when the text is not JSON or names no known
    /// sensor or command. The rig is left untouched.
    pub fn handle_json(&mut self, text: &str) -> Result<()> {
        let message: ControlMessage = serde_json::from_str(text).map_err(|e| {
            log::warn!("Ignoring control message: {}", e);
            SenseError::malformed_message("unrecognised control message", e)
        })?;
        self.handle_message(&message);
        Ok(())
    }

    pub fn environment(&self) -> &EnvironmentalConditions {
        self.environment.conditions()
    }

    pub fn as7262(&self) -> &As7262 {
        &self.as7262
    }

    pub fn tsl2591(&self) -> &Tsl2591 {
        &self.tsl2591
    }

    pub fn sen0611(&self) -> &Sen0611 {
        &self.sen0611
    }
}

impl Default for SensorRig {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
