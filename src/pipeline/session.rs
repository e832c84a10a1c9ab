//! Per-dashboard processing session
//!
//! A [`Session`] owns the only mutable state of the fusion pipeline: the
//! noise filter history, the active strategy and the camera target CCT.
//! Independent sessions never share state.

use crate::calibration::WhiteBalanceCalculator;
use crate::color::{calculate_color_temperature, spectrum, ColorConverter, SpectralChannels};
use crate::config::SessionConfig;
use crate::constants::camera;
use crate::filter::{FilterStrategy, NoiseFilter};
use crate::pipeline::confidence::{fuse_luminance, ConfidenceAssessor};
use crate::pipeline::record::{ProcessedRecord, RawRow};
use crate::simulator::SimulatorFrame;
use crate::{Result, SenseError};

/// Fusion pipeline state for one consumer
#[derive(Debug, Clone)]
pub struct Session {
    filter: NoiseFilter,
    strategy: FilterStrategy,
    white_balance: WhiteBalanceCalculator,
    confidence: ConfidenceAssessor,
    converter: ColorConverter,
    processed: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            filter: NoiseFilter::default(),
            strategy: FilterStrategy::default(),
            white_balance: WhiteBalanceCalculator::default(),
            confidence: ConfidenceAssessor::default(),
            converter: ColorConverter::new(),
            processed: 0,
        }
    }
}

impl Session {
    /// Create a session with default filter (Kalman) and a 5600 K target
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session from configuration
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self {
            filter: NoiseFilter::with_params(config.filter.params()),
            strategy: config.filter.strategy,
            confidence: ConfidenceAssessor::new(config.filter.window_size),
            ..Self::default()
        };
        session.set_target_cct(config.camera.target_cct)?;
        Ok(session)
    }

    pub fn strategy(&self) -> FilterStrategy {
        self.strategy
    }

    /// Switch the filter strategy for subsequent rows
    ///
    /// Channels filtered with an incompatible strategy are reseeded on
    /// their next value.
    pub fn set_strategy(&mut self, strategy: FilterStrategy) {
        if strategy != self.strategy {
            log::info!("Filter strategy changed: {} -> {}", self.strategy, strategy);
            self.strategy = strategy;
        }
    }

    pub fn target_cct(&self) -> f64 {
        self.white_balance.target_cct()
    }

    /// Set the camera white balance target
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` outside [2000, 10000] K; the previous
    /// target stays active.
    pub fn set_target_cct(&mut self, target_cct: f64) -> Result<()> {
        if !(camera::MIN_TARGET_CCT_K..=camera::MAX_TARGET_CCT_K).contains(&target_cct) {
            log::warn!(
                "Rejected target CCT {} K, keeping {} K",
                target_cct,
                self.target_cct()
            );
            return Err(SenseError::InvalidParameter {
                parameter: "target_cct".to_string(),
                value: format!("{} K", target_cct),
            });
        }
        self.white_balance = WhiteBalanceCalculator::new(target_cct);
        Ok(())
    }

    pub fn filter(&self) -> &NoiseFilter {
        &self.filter
    }

    /// Rows processed since creation or the last reset
    pub fn processed_count(&self) -> u64 {
        self.processed
    }

    /// Drop all filter and residual history
    pub fn reset(&mut self) {
        self.filter.reset();
        self.confidence.reset();
        self.processed = 0;
        log::info!("Session state reset");
    }

    /// Run one raw row through filter, color engine and camera derivation
    pub fn process_row(&mut self, row: &RawRow) -> ProcessedRecord {
        let raw = row.spectral_channels();
        let filtered = self.filter_channels(&raw);
        let sensor_temperature_c = row
            .sensor_temperature()
            .map(|t| self.filter.filter(spectrum::TEMPERATURE_KEY, t, self.strategy));

        let color = calculate_color_temperature(&filtered);
        let camera_settings = self.white_balance.settings(color.cct, color.tint);
        let confidence = self
            .confidence
            .assess(&raw, &filtered, row.luminance, row.sensor_cct);

        let fused_luminance_lux = fuse_luminance(row.luminance, row.als, &confidence);

        let mut out_row = row.clone();
        out_row.set_flat_channels(&filtered);
        // Derived columns replace raw ones of the same name
        out_row
            .extra
            .retain(|key, _| !ProcessedRecord::DERIVED_FIELDS.contains(&key.as_str()));

        self.processed += 1;
        log::debug!(
            "Row {}: CCT {} K, tint {:.3}, r/g/b {}/{}/{}",
            self.processed,
            color.cct,
            color.tint,
            camera_settings.r_multiplier,
            camera_settings.g_multiplier,
            camera_settings.b_multiplier
        );

        ProcessedRecord {
            row: out_row,
            color_temperature_k: color.cct,
            tint: color.tint,
            camera_settings,
            chromaticity: color.chromaticity,
            sensor_temperature_c,
            preview_hex: self.converter.preview_hex(color.xyz),
            confidence,
            fused_luminance_lux,
        }
    }

    /// Process one simulator frame
    pub fn process_frame(&mut self, frame: &SimulatorFrame) -> ProcessedRecord {
        self.process_row(&frame.to_raw_row())
    }

    fn filter_channels(&mut self, raw: &SpectralChannels) -> SpectralChannels {
        let mut values = raw.to_array();
        for (key, v) in spectrum::CHANNEL_KEYS.iter().zip(values.iter_mut()) {
            *v = self.filter.filter(key, *v, self.strategy);
        }
        SpectralChannels::from_array(values)
    }
}
