//! Response types returned by the control surface.

use super::*;
use crate::config::InstrumentKind;
use crate::encoding::EncodedArray;
use serde::Serialize;

/// Confirmation of a successful initialize.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeResponse {
    pub kind: String,
    pub data_source: String,
    pub message: String,
}

impl InitializeResponse {
    pub fn new(kind: InstrumentKind, data_source: &str) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            data_source: data_source.to_string(),
            message: format!("Microscope {} initialized with data: {}", kind, data_source),
        }
    }
}

/// Scan-area bounds plus the current tip position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanAreaResponse {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub current_pos: [f64; 2],
}

impl ScanAreaResponse {
    pub fn new(bounds: Bounds, position: Position) -> Self {
        Self {
            x_range: [bounds.x_min, bounds.x_max],
            y_range: [bounds.y_min, bounds.y_max],
            current_pos: [position.x, position.y],
        }
    }
}

/// Encoded single-line scan.
#[derive(Debug, Clone, Serialize)]
pub struct LineScanResponse {
    pub line_data: serde_json::Value,
    pub shape: Vec<usize>,
}

impl From<EncodedArray> for LineScanResponse {
    fn from(encoded: EncodedArray) -> Self {
        Self {
            line_data: encoded.data,
            shape: encoded.shape,
        }
    }
}

/// Confirmation of a tip move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveResponse {
    pub x: f64,
    pub y: f64,
    pub message: String,
}

impl MoveResponse {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            message: format!("Tip moved to x={}, y={}", x, y),
        }
    }
}
