//! Scan geometry and parameter types.

use crate::error::{MicroscopeError, Result};
use serde::{Deserialize, Serialize};

/// Raster direction of a scan.
///
/// `Horizontal` means the fast axis is x (rows are acquired along x);
/// `Vertical` means the fast axis is y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDirection {
    #[default]
    Horizontal,
    Vertical,
}

impl ScanDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanDirection::Horizontal => "horizontal",
            ScanDirection::Vertical => "vertical",
        }
    }

    /// Parse a direction name, rejecting anything that is not a known direction.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" => Ok(ScanDirection::Horizontal),
            "vertical" => Ok(ScanDirection::Vertical),
            other => Err(MicroscopeError::InvalidParams {
                message: format!(
                    "Invalid direction '{}': expected 'horizontal' or 'vertical'",
                    other
                ),
            }),
        }
    }
}

impl std::fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which channels a scan should report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    /// Every channel the instrument exposes, in its native order.
    #[default]
    InstrumentDefault,
    /// An explicit, ordered, non-empty list of channel names.
    Named(Vec<String>),
}

impl ChannelSelection {
    /// Build a selection from an optional list; `None` means instrument default.
    pub fn from_names(names: Option<Vec<String>>) -> Result<Self> {
        match names {
            None => Ok(ChannelSelection::InstrumentDefault),
            Some(names) if names.is_empty() => Err(MicroscopeError::InvalidParams {
                message: "channels must not be an empty list".to_string(),
            }),
            Some(names) => Ok(ChannelSelection::Named(names)),
        }
    }
}

/// Physical extent of the scan area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.is_finite()
            && y.is_finite()
            && (self.x_min..=self.x_max).contains(&x)
            && (self.y_min..=self.y_max).contains(&y)
    }

    /// `(min, max)` of the axis a coordinate refers to.
    pub fn axis_range(&self, axis: char) -> (f64, f64) {
        match axis {
            'x' => (self.x_min, self.x_max),
            _ => (self.y_min, self.y_max),
        }
    }
}

/// Tip position in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}
