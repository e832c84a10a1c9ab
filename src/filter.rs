//! Per-channel noise filtering
//!
//! [`NoiseFilter`] keeps independent smoothing state for every channel key
//! it has seen (for example `"spectral_450nm"`). State is created lazily on
//! the first value for a key and lives as long as the filter.
//!
//! Four strategies are available:
//!
//! - moving average and median over a bounded window of recent values
//! - exponential smoothing seeded by the first value
//! - a scalar Kalman filter with constant dynamics
//!
//! Filtering never fails. Non-finite input is ignored: the state is left
//! unchanged and the current estimate (or 0 before any estimate exists) is
//! returned.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::constants::filtering;
use crate::error::SenseError;

/// Prefix applied to record field names to form channel keys
pub const RECORD_KEY_PREFIX: &str = "spectral_";

/// Smoothing strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterStrategy {
    MovingAverage,
    Median,
    Exponential,
    #[default]
    Kalman,
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterStrategy::MovingAverage => "moving-average",
            FilterStrategy::Median => "median",
            FilterStrategy::Exponential => "exponential",
            FilterStrategy::Kalman => "kalman",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterStrategy {
    type Err = SenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "moving-average" | "movingaverage" | "average" => Ok(FilterStrategy::MovingAverage),
            "median" => Ok(FilterStrategy::Median),
            "exponential" | "ema" => Ok(FilterStrategy::Exponential),
            "kalman" => Ok(FilterStrategy::Kalman),
            _ => Err(SenseError::InvalidParameter {
                parameter: "filter strategy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Tuning parameters shared by all channels of one filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// History length for moving average and median
    pub window_size: usize,
    /// Exponential smoothing factor
    pub alpha: f64,
    /// Kalman process noise (Q)
    pub process_noise: f64,
    /// Kalman measurement noise (R)
    pub measurement_noise: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            window_size: filtering::DEFAULT_WINDOW_SIZE,
            alpha: filtering::DEFAULT_ALPHA,
            process_noise: filtering::DEFAULT_PROCESS_NOISE,
            measurement_noise: filtering::DEFAULT_MEASUREMENT_NOISE,
        }
    }
}

#[derive(Debug, Clone)]
enum ChannelState {
    /// Shared by moving average and median
    Window(VecDeque<f64>),
    Exponential {
        smoothed: f64,
    },
    Kalman {
        estimate: f64,
        error_covariance: f64,
    },
}

impl ChannelState {
    fn serves(&self, strategy: FilterStrategy) -> bool {
        matches!(
            (self, strategy),
            (ChannelState::Window(_), FilterStrategy::MovingAverage | FilterStrategy::Median)
                | (ChannelState::Exponential { .. }, FilterStrategy::Exponential)
                | (ChannelState::Kalman { .. }, FilterStrategy::Kalman)
        )
    }

    fn current(&self, strategy: FilterStrategy) -> Option<f64> {
        match self {
            ChannelState::Window(history) if history.is_empty() => None,
            ChannelState::Window(history) => Some(match strategy {
                FilterStrategy::Median => median(history),
                _ => mean(history),
            }),
            ChannelState::Exponential { smoothed } => Some(*smoothed),
            ChannelState::Kalman { estimate, .. } => Some(*estimate),
        }
    }
}

/// Stateful per-channel smoother
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    params: FilterParams,
    channels: HashMap<String, ChannelState>,
}

impl NoiseFilter {
    /// Create a filter with default parameters and the given window size
    pub fn new(window_size: usize) -> Self {
        Self::with_params(FilterParams {
            window_size,
            ..Default::default()
        })
    }

    /// Create a filter with explicit parameters
    ///
    /// A window size of 0 is raised to 1.
    pub fn with_params(params: FilterParams) -> Self {
        Self {
            params: FilterParams {
                window_size: params.window_size.max(1),
                ..params
            },
            channels: HashMap::new(),
        }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn window_size(&self) -> usize {
        self.params.window_size
    }

    /// Feed one value for `key` and return the smoothed value
    ///
    /// If `key` was last filtered with an incompatible strategy its state
    /// is discarded and reseeded from `value`.
    pub fn filter(&mut self, key: &str, value: f64, strategy: FilterStrategy) -> f64 {
        if !value.is_finite() {
            return self
                .channels
                .get(key)
                .filter(|state| state.serves(strategy))
                .and_then(|state| state.current(strategy))
                .unwrap_or(0.0);
        }

        let params = self.params;
        match self.channels.get_mut(key) {
            Some(state) if state.serves(strategy) => update(state, value, strategy, &params),
            _ => {
                let (state, seeded) = seed(value, strategy);
                self.channels.insert(key.to_string(), state);
                seeded
            }
        }
    }

    /// Filter every numeric field of a spectral record
    ///
    /// Field `450nm` is tracked under channel key `spectral_450nm`. Fields
    /// that are not numbers pass through unchanged.
    pub fn filter_record(&mut self, record: &Map<String, Value>, strategy: FilterStrategy) -> Map<String, Value> {
        record
            .iter()
            .map(|(key, value)| {
                let filtered = match value.as_f64() {
                    Some(n) => {
                        let channel = format!("{}{}", RECORD_KEY_PREFIX, key);
                        Value::from(self.filter(&channel, n, strategy))
                    }
                    None => value.clone(),
                };
                (key.clone(), filtered)
            })
            .collect()
    }

    /// Current Kalman error covariance for `key`, if it is Kalman-filtered
    pub fn error_covariance(&self, key: &str) -> Option<f64> {
        match self.channels.get(key) {
            Some(ChannelState::Kalman { error_covariance, .. }) => Some(*error_covariance),
            _ => None,
        }
    }

    /// Number of values currently held for `key` by a windowed strategy
    pub fn history_len(&self, key: &str) -> usize {
        match self.channels.get(key) {
            Some(ChannelState::Window(history)) => history.len(),
            _ => 0,
        }
    }

    /// Whether any state exists for `key`
    pub fn is_tracking(&self, key: &str) -> bool {
        self.channels.contains_key(key)
    }

    /// Drop the state of all channels
    pub fn reset(&mut self) {
        self.channels.clear();
    }
}

fn seed(value: f64, strategy: FilterStrategy) -> (ChannelState, f64) {
    let state = match strategy {
        FilterStrategy::MovingAverage | FilterStrategy::Median => {
            ChannelState::Window(VecDeque::from([value]))
        }
        FilterStrategy::Exponential => ChannelState::Exponential { smoothed: value },
        FilterStrategy::Kalman => ChannelState::Kalman {
            estimate: value,
            error_covariance: filtering::INITIAL_ERROR_COVARIANCE,
        },
    };
    (state, value)
}

fn update(state: &mut ChannelState, value: f64, strategy: FilterStrategy, params: &FilterParams) -> f64 {
    match state {
        ChannelState::Window(history) => {
            history.push_back(value);
            while history.len() > params.window_size {
                history.pop_front();
            }
            match strategy {
                FilterStrategy::Median => median(history),
                _ => mean(history),
            }
        }
        ChannelState::Exponential { smoothed } => {
            *smoothed = params.alpha * value + (1.0 - params.alpha) * *smoothed;
            *smoothed
        }
        ChannelState::Kalman {
            estimate,
            error_covariance,
        } => {
            let predicted = *error_covariance + params.process_noise;
            let gain = predicted / (predicted + params.measurement_noise);
            *estimate += gain * (value - *estimate);
            *error_covariance = (1.0 - gain) * predicted;
            *estimate
        }
    }
}

fn mean(history: &VecDeque<f64>) -> f64 {
    history.iter().sum::<f64>() / history.len() as f64
}

fn median(history: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = history.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
