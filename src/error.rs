//! Pipeline error types
//!
//! Only input-shape problems are errors. Sparse data (no landing, no plane
//! samples) and geometric anomalies are handled as skipped layers.

use thiserror::Error;

/// Failures that abort processing of a single match
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The match was expected to carry telemetry but the event list is empty
    #[error("match has no telemetry events")]
    NoTelemetry,

    /// Map name does not resolve to one of the supported maps
    #[error("map `{0}` is not supported")]
    UnsupportedMap(String),

    /// Telemetry payload is not a JSON array of events
    #[error("malformed telemetry payload: {0}")]
    MalformedTelemetry(#[from] serde_json::Error),

    /// Render settings failed validation
    #[error("invalid render settings: {0}")]
    InvalidSettings(String),

    /// A supplied image does not match its declared dimensions
    #[error("image `{name}` has {actual} pixels, expected {expected}")]
    AssetSize {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
