//! Error types and result aliases for gemdex operations.
//!
//! Provides a unified error type covering every failure the normalization
//! and ordering engine can surface. All engine errors are fatal for the
//! record or stream being processed: there is no retry logic and no
//! best-effort partial output.

use thiserror::Error;

/// Unified error type for all gemdex operations
#[derive(Error, Debug)]
pub enum GemdexError {
    // Version errors
    #[error("invalid version: {input:?}")]
    InvalidVersion { input: String },

    // Date errors
    #[error("unexpected date value: {value}")]
    UnexpectedDateValue { value: String },

    // Normalizer errors
    #[error("malformed spec: {reason}")]
    MalformedSpec { reason: String },

    // Index stream errors
    #[error("index decode error at byte {offset}: {reason}")]
    IndexDecode { offset: usize, reason: String },

    #[error("malformed index record {index}: {reason}")]
    MalformedIndexRecord { index: usize, reason: String },

    // Manifest (Gemfile) errors
    #[error("nested groups are not supported (already inside group '{group}')")]
    NestedGroupingUnsupported { group: String },

    #[error("invalid version constraint: {input:?}")]
    InvalidConstraint { input: String },

    // Store errors
    #[error("package directory unavailable: {path}")]
    StoreDirectoryUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for gemdex operations
pub type GemdexResult<T> = Result<T, GemdexError>;

impl GemdexError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create an index decode error
    pub fn decode(offset: usize, reason: impl Into<String>) -> Self {
        Self::IndexDecode {
            offset,
            reason: reason.into(),
        }
    }

    /// Create a structural error for the record at `index` in the stream
    pub fn record(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedIndexRecord {
            index,
            reason: reason.into(),
        }
    }
}
