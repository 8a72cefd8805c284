//! Error types for the tracking pipeline.
//!
//! Only structural input problems are errors. Pings that fail the map-matching
//! filter, or buckets where no cluster survives, degrade to empty output instead.

use thiserror::Error;

/// Errors produced while building route geometry or running the pipeline.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The requested shape id has no rows in the shape table.
    #[error("shape_id {shape_id} not found")]
    ShapeNotFound { shape_id: String },

    /// A `shape_pt_sequence` value could not be coerced to an integer.
    #[error("shape_id {shape_id}: non-numeric shape_pt_sequence {value:?}")]
    InvalidSequence { shape_id: String, value: String },

    /// A polyline needs at least one point.
    #[error("polyline has no points")]
    EmptyPolyline,

    /// A configuration value is out of range.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// A `t` cell that is neither a number nor a recognised date-time.
    #[error("invalid timestamp {value:?}")]
    InvalidTimestamp { value: String },

    #[cfg(feature = "io")]
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrackerError>;
