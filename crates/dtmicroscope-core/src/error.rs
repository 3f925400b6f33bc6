//! Error types for the digital-twin microscope.
//!
//! Every control operation returns [`Result`], so the transport layer can
//! render any failure as a structured `{error: {kind, message}}` value
//! instead of a fault.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for microscope operations.
#[derive(Debug, Error)]
pub enum MicroscopeError {
    // Session lifecycle errors
    #[error("Microscope not initialized")]
    NotInitialized,

    #[error("Unsupported instrument kind: {kind}")]
    UnsupportedKind { kind: String },

    // Parameter errors
    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Unknown channel '{channel}', available: {available:?}")]
    UnknownChannel {
        channel: String,
        available: Vec<String>,
    },

    // Instrument errors
    #[error("Coordinate {coordinate} outside {axis} range [{min}, {max}]")]
    CoordinateOutOfRange {
        axis: char,
        coordinate: f64,
        min: f64,
        max: f64,
    },

    #[error("Position ({x}, {y}) outside scan area")]
    PositionOutOfRange { x: f64, y: f64 },

    #[error("Invalid data source: {source_uri}")]
    InvalidDataSource { source_uri: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for microscope operations.
pub type Result<T> = std::result::Result<T, MicroscopeError>;

impl From<std::io::Error> for MicroscopeError {
    fn from(err: std::io::Error) -> Self {
        MicroscopeError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for MicroscopeError {
    fn from(err: serde_json::Error) -> Self {
        MicroscopeError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Serializable view of an error, as sent over the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl MicroscopeError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        MicroscopeError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Stable snake_case tag for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            MicroscopeError::NotInitialized => "not_initialized",
            MicroscopeError::UnsupportedKind { .. } => "unsupported_kind",
            MicroscopeError::InvalidParams { .. } => "invalid_params",
            MicroscopeError::UnknownChannel { .. } => "unknown_channel",
            MicroscopeError::CoordinateOutOfRange { .. } => "coordinate_out_of_range",
            MicroscopeError::PositionOutOfRange { .. } => "position_out_of_range",
            MicroscopeError::InvalidDataSource { .. } => "invalid_data_source",
            MicroscopeError::Dataset { .. } => "dataset",
            MicroscopeError::Io { .. } => "io",
            MicroscopeError::Json { .. } => "json",
            MicroscopeError::Other(_) => "other",
        }
    }

    /// Convert into the `{kind, message}` body sent to callers.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32001: Microscope not initialized
    /// - -32002: Unsupported instrument kind
    /// - -32003: Instrument rejected the request (range, channel)
    /// - -32004: Data source could not be loaded
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            MicroscopeError::NotInitialized => -32001,

            MicroscopeError::UnsupportedKind { .. } => -32002,

            MicroscopeError::UnknownChannel { .. }
            | MicroscopeError::CoordinateOutOfRange { .. }
            | MicroscopeError::PositionOutOfRange { .. } => -32003,

            MicroscopeError::InvalidDataSource { .. }
            | MicroscopeError::Dataset { .. }
            | MicroscopeError::Io { .. } => -32004,

            MicroscopeError::InvalidParams { .. } => -32602,

            _ => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MicroscopeError::NotInitialized;
        assert_eq!(err.to_string(), "Microscope not initialized");

        let err = MicroscopeError::UnsupportedKind {
            kind: "STEM".into(),
        };
        assert_eq!(err.to_string(), "Unsupported instrument kind: STEM");
    }

    #[test]
    fn test_rpc_error_codes() {
        assert_eq!(MicroscopeError::NotInitialized.to_rpc_error_code(), -32001);
        assert_eq!(
            MicroscopeError::InvalidParams {
                message: "bad".into()
            }
            .to_rpc_error_code(),
            -32602
        );
        assert_eq!(
            MicroscopeError::PositionOutOfRange { x: 1.0, y: 2.0 }.to_rpc_error_code(),
            -32003
        );
        assert_eq!(
            MicroscopeError::Other("boom".into()).to_rpc_error_code(),
            -32603
        );
    }

    #[test]
    fn test_error_body() {
        let body = MicroscopeError::NotInitialized.to_body();
        assert_eq!(body.kind, "not_initialized");
        assert_eq!(body.message, "Microscope not initialized");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "not_initialized");
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let err = MicroscopeError::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            "/data/scan.json",
        );
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("/data/scan.json"));
    }
}
