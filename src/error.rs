//! Error types for the colorsense library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for colorsense operations
pub type Result<T> = std::result::Result<T, SenseError>;

/// Error types for session, configuration and data-source operations.
///
/// The color science engine, the noise filter and the sensor simulators
/// never produce errors; degenerate input is mapped to documented fallbacks
/// inside those modules.
#[derive(Error, Debug)]
pub enum SenseError {
    /// The data source does not exist or cannot be opened
    #[error("Data source not found: {}", path.display())]
    DataSourceMissing {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The data source exists but holds no readings
    #[error("Data source is empty: {}", path.display())]
    EmptyDataSource { path: PathBuf },

    /// A raw reading row could not be decoded
    #[error("Failed to decode record {index}: {message}")]
    RecordDecode { index: usize, message: String },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Control message is not valid JSON or has an unknown shape
    #[error("Malformed control message: {message}")]
    MalformedMessage {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Periodic task failed to shut down cleanly
    #[error("Scheduler error: {reason}")]
    Scheduler { reason: String },
}

impl SenseError {
    /// Create a configuration error with context
    pub fn config_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed-message error from a JSON failure
    pub fn malformed_message(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedMessage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// Recoverable errors leave the session untouched; the caller may keep
    /// ticking. Data-source errors halt startup.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SenseError::InvalidParameter { .. }
                | SenseError::MalformedMessage { .. }
                | SenseError::RecordDecode { .. }
        )
    }

    /// Get user-friendly error description for dashboard display
    pub fn user_message(&self) -> String {
        match self {
            SenseError::DataSourceMissing { .. } => {
                "No sensor data available. Please check the data file and try again.".to_string()
            }
            SenseError::EmptyDataSource { .. } => {
                "The sensor data file contains no readings.".to_string()
            }
            SenseError::InvalidParameter { parameter, value } => {
                format!("The value {} is not allowed for {}.", value, parameter)
            }
            SenseError::MalformedMessage { .. } => {
                "The control message could not be understood.".to_string()
            }
            _ => "Processing failed. Please restart the session.".to_string(),
        }
    }
}
