//! Cross-sensor consistency scoring
//!
//! Each processed record carries a per-sensor confidence weight in
//! [0.1, 1]. Weights drop when one sensor disagrees with another or when
//! a reading jumps away from its recent track. They never change the
//! computed CCT or tint; they only weight the fused luminance.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::color::SpectralChannels;
use crate::constants::{confidence, filtering};

/// Confidence weight per sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfidence {
    pub as7262: f64,
    pub tsl2591: f64,
    pub sen0611: f64,
}

impl Default for SensorConfidence {
    fn default() -> Self {
        Self {
            as7262: 1.0,
            tsl2591: 1.0,
            sen0611: 1.0,
        }
    }
}

impl SensorConfidence {
    fn floored(self) -> Self {
        Self {
            as7262: self.as7262.max(confidence::FLOOR),
            tsl2591: self.tsl2591.max(confidence::FLOOR),
            sen0611: self.sen0611.max(confidence::FLOOR),
        }
    }
}

/// Scores readings against each other and against their recent history
#[derive(Debug, Clone)]
pub struct ConfidenceAssessor {
    residuals: [VecDeque<f64>; 6],
    luminance: VecDeque<f64>,
    cct: VecDeque<f64>,
    window: usize,
}

impl Default for ConfidenceAssessor {
    fn default() -> Self {
        Self::new(filtering::DEFAULT_WINDOW_SIZE)
    }
}

impl ConfidenceAssessor {
    pub fn new(window: usize) -> Self {
        Self {
            residuals: Default::default(),
            luminance: VecDeque::new(),
            cct: VecDeque::new(),
            window: window.max(2),
        }
    }

    /// Score one reading
    ///
    /// * `raw` / `filtered` - spectral channels before and after filtering
    /// * `luminance` - TSL2591 lux, when the row has it
    /// * `sensor_cct` - SEN0611 CCT, when the row has it
    ///
    /// Spectral outliers are judged on filter residuals; luminance and CCT
    /// outliers on their distance from the recent mean. Cross-sensor checks
    /// use the raw spectrum.
    pub fn assess(
        &mut self,
        raw: &SpectralChannels,
        filtered: &SpectralChannels,
        luminance: Option<f64>,
        sensor_cct: Option<f64>,
    ) -> SensorConfidence {
        let mut score = SensorConfidence::default();
        let luminance = luminance.filter(|l| l.is_finite());
        let sensor_cct = sensor_cct.filter(|c| c.is_finite());

        let outliers = self.count_outliers(raw, filtered);
        if outliers > 0 {
            let ratio = outliers as f64 / 6.0;
            score.as7262 = (1.0 - ratio).max(confidence::FLOOR);
        }
        if let Some(lux) = luminance {
            if track_scalar(&mut self.luminance, lux, self.window) {
                score.tsl2591 = confidence::SCALAR_OUTLIER_WEIGHT;
            }
        }
        if let Some(cct) = sensor_cct {
            if track_scalar(&mut self.cct, cct, self.window) {
                score.sen0611 = confidence::SCALAR_OUTLIER_WEIGHT;
            }
        }

        let spectrum = raw.sanitized();
        let spectral_sum = spectrum.total();
        if let Some(lux) = luminance {
            if spectral_sum > 0.0 {
                let ratio = lux / spectral_sum;
                if !(confidence::LUMINANCE_RATIO_MIN..=confidence::LUMINANCE_RATIO_MAX).contains(&ratio) {
                    score.as7262 *= confidence::PENALTY;
                    score.tsl2591 *= confidence::PENALTY;
                }
            }
        }

        if let Some(cct) = sensor_cct {
            let blue_red = spectrum.violet / (spectrum.red + 1e-6);
            let expected = 0.5 + cct / 10_000.0;
            if ((blue_red - expected) / expected).abs() > confidence::BLUE_RED_TOLERANCE {
                score.as7262 *= confidence::PENALTY;
                score.sen0611 *= confidence::PENALTY;
            }
        }

        score.floored()
    }

    /// Drop all history
    pub fn reset(&mut self) {
        for history in self.residuals.iter_mut() {
            history.clear();
        }
        self.luminance.clear();
        self.cct.clear();
    }

    /// Count channels whose residual exceeds the outlier threshold, then
    /// record the residuals
    fn count_outliers(&mut self, raw: &SpectralChannels, filtered: &SpectralChannels) -> usize {
        let mut outliers = 0;
        for ((history, r), f) in self
            .residuals
            .iter_mut()
            .zip(raw.to_array())
            .zip(filtered.to_array())
        {
            let residual = r - f;
            if !residual.is_finite() {
                continue;
            }
            if history.len() >= 3 {
                let sigma = std_dev(history);
                if sigma > 0.0 && residual.abs() > confidence::OUTLIER_SIGMA * sigma {
                    outliers += 1;
                }
            }
            push_bounded(history, residual, self.window);
        }
        outliers
    }
}

/// Blend TSL2591 lux and SEN0611 ALS weighted by their confidence
///
/// Falls back to whichever reading is present; `None` when neither is.
pub fn fuse_luminance(lux: Option<f64>, als: Option<f64>, weights: &SensorConfidence) -> Option<f64> {
    match (lux.filter(|v| v.is_finite()), als.filter(|v| v.is_finite())) {
        (Some(lux), Some(als)) => Some(
            (lux * weights.tsl2591 + als * weights.sen0611) / (weights.tsl2591 + weights.sen0611),
        ),
        (Some(lux), None) => Some(lux),
        (None, Some(als)) => Some(als),
        (None, None) => None,
    }
}

/// Record `value` and report whether it strays from the recent mean
fn track_scalar(history: &mut VecDeque<f64>, value: f64, window: usize) -> bool {
    let outlier = history.len() >= 3 && {
        let n = history.len() as f64;
        let mean = history.iter().sum::<f64>() / n;
        let sigma = std_dev(history);
        sigma > 0.0 && (value - mean).abs() > confidence::OUTLIER_SIGMA * sigma
    };
    push_bounded(history, value, window);
    outlier
}

fn push_bounded(history: &mut VecDeque<f64>, value: f64, window: usize) {
    history.push_back(value);
    while history.len() > window {
        history.pop_front();
    }
}

fn std_dev(values: &VecDeque<f64>) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
