//! Dashboard fusion pipeline
//!
//! Raw rows (recorded or simulated) flow through a [`Session`]: noise
//! filter, color engine, camera derivation and cross-sensor confidence.

pub mod confidence;
pub mod record;
pub mod replay;
pub mod session;

pub use confidence::{fuse_luminance, ConfidenceAssessor, SensorConfidence};
pub use record::{ProcessedRecord, RawRow, SpectralBlock};
pub use replay::{DashboardReplay, RecordSource};
pub use session::Session;
