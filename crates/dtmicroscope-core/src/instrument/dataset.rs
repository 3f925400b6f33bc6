//! Scan datasets backing a simulated instrument.
//!
//! A dataset is a stack of per-channel images over a rectangular physical
//! extent. It comes either from a JSON file or from the built-in synthetic
//! generator (`synthetic:NXxNY`).

use crate::config::InstrumentConfig;
use crate::error::{MicroscopeError, Result};
use crate::models::{Bounds, Position};
use ndarray::{Array2, Array3, Axis};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Synthetic { nx: usize, ny: usize },
}

impl DataSource {
    /// Parse a data source string: `synthetic:NXxNY` or a file path.
    pub fn parse(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(MicroscopeError::InvalidDataSource {
                source_uri: source.to_string(),
            });
        }

        let Some(spec) = trimmed.strip_prefix(InstrumentConfig::SYNTHETIC_SCHEME) else {
            return Ok(DataSource::File(PathBuf::from(trimmed)));
        };

        let invalid = || MicroscopeError::InvalidDataSource {
            source_uri: source.to_string(),
        };
        let (nx, ny) = spec.split_once(['x', 'X']).ok_or_else(invalid)?;
        let nx: usize = nx.trim().parse().map_err(|_| invalid())?;
        let ny: usize = ny.trim().parse().map_err(|_| invalid())?;

        let max = InstrumentConfig::SYNTHETIC_MAX_PIXELS;
        if nx == 0 || ny == 0 || nx > max || ny > max {
            return Err(invalid());
        }
        Ok(DataSource::Synthetic { nx, ny })
    }
}

/// On-disk dataset layout.
#[derive(Debug, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    name: Option<String>,
    channels: Vec<String>,
    x_range: [f64; 2],
    y_range: [f64; 2],
    #[serde(default)]
    start_position: Option<[f64; 2]>,
    #[serde(default)]
    units: Option<String>,
    images: HashMap<String, Vec<Vec<f32>>>,
}

/// A loaded, validated dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub units: String,
    pub channels: Vec<String>,
    pub bounds: Bounds,
    pub start: Position,
    /// Images indexed `[channel, y, x]`.
    pub images: Array3<f32>,
}

impl Dataset {
    /// Load a dataset from whichever source the string names.
    pub async fn load(source: &DataSource) -> Result<Self> {
        match source {
            DataSource::File(path) => Self::from_file(path).await,
            DataSource::Synthetic { nx, ny } => Ok(Self::synthetic(*nx, *ny)),
        }
    }

    /// Read and validate a JSON dataset file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MicroscopeError::io_with_path(e, path))?;

        let file: DatasetFile = serde_json::from_slice(&bytes).map_err(|e| MicroscopeError::Json {
            message: format!("Failed to parse {}: {}", path.display(), e),
            source: Some(e),
        })?;

        let fallback_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());

        let dataset = Self::from_parts(file, fallback_name)?;
        debug!(
            "Loaded dataset '{}' from {} ({} channels, {:?})",
            dataset.name,
            path.display(),
            dataset.channels.len(),
            dataset.images.shape()
        );
        Ok(dataset)
    }

    fn from_parts(file: DatasetFile, fallback_name: String) -> Result<Self> {
        if file.channels.is_empty() {
            return Err(dataset_error("dataset declares no channels"));
        }

        let [x_min, x_max] = file.x_range;
        let [y_min, y_max] = file.y_range;
        let extents = [x_min, x_max, y_min, y_max];
        if extents.iter().any(|v| !v.is_finite()) || x_min >= x_max || y_min >= y_max {
            return Err(dataset_error(format!(
                "invalid extent x={:?} y={:?}",
                file.x_range, file.y_range
            )));
        }
        let bounds = Bounds {
            x_min,
            x_max,
            y_min,
            y_max,
        };

        let start = match file.start_position {
            Some([x, y]) if bounds.contains(x, y) => Position { x, y },
            Some([x, y]) => {
                return Err(dataset_error(format!(
                    "start position ({}, {}) lies outside the scan area",
                    x, y
                )))
            }
            None => Position { x: x_min, y: y_min },
        };

        let mut planes = Vec::with_capacity(file.channels.len());
        for channel in &file.channels {
            let rows = file
                .images
                .get(channel)
                .ok_or_else(|| dataset_error(format!("missing image for channel '{}'", channel)))?;
            planes.push(rows_to_plane(channel, rows)?);
        }

        let dim = planes[0].dim();
        if let Some((i, _)) = planes.iter().enumerate().find(|(_, p)| p.dim() != dim) {
            return Err(dataset_error(format!(
                "channel '{}' has dimensions {:?}, expected {:?}",
                file.channels[i],
                planes[i].dim(),
                dim
            )));
        }

        let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
        let images = ndarray::stack(Axis(0), &views)
            .map_err(|e| dataset_error(format!("failed to stack channels: {}", e)))?;

        Ok(Self {
            name: file.name.unwrap_or(fallback_name),
            units: file.units.unwrap_or_else(|| "m".to_string()),
            channels: file.channels,
            bounds,
            start,
            images,
        })
    }

    /// Deterministic synthetic sample: a periodic surface with stripe
    /// domains whose walls show up in amplitude and flip the phase.
    pub fn synthetic(nx: usize, ny: usize) -> Self {
        let extent = InstrumentConfig::SYNTHETIC_EXTENT_M;
        let period = extent / 4.0;
        let tau = std::f64::consts::TAU;

        let channels: Vec<String> = InstrumentConfig::SYNTHETIC_CHANNELS
            .iter()
            .map(|c| c.to_string())
            .collect();

        let step = |n: usize| if n > 1 { extent / (n - 1) as f64 } else { 0.0 };
        let (dx, dy) = (step(nx), step(ny));

        let images = Array3::from_shape_fn((channels.len(), ny, nx), |(c, iy, ix)| {
            let x = ix as f64 * dx;
            let y = iy as f64 * dy;
            // Domain order parameter along a tilted stripe pattern.
            let order = (tau * (x + 0.5 * y) / period).sin();
            let value = match c {
                0 => 2e-9 * (tau * x / period).sin() * (tau * y / period).cos() + 1e-10 * (x / extent),
                1 => 1.0 - (order / 0.2).tanh().abs(),
                _ => {
                    if order >= 0.0 {
                        90.0
                    } else {
                        -90.0
                    }
                }
            };
            value as f32
        });

        Self {
            name: format!("synthetic {}x{}", nx, ny),
            units: "m".to_string(),
            channels,
            bounds: Bounds {
                x_min: 0.0,
                x_max: extent,
                y_min: 0.0,
                y_max: extent,
            },
            start: Position { x: 0.0, y: 0.0 },
            images,
        }
    }

    /// Grid size as `(nx, ny)`.
    pub fn grid(&self) -> (usize, usize) {
        let (_, ny, nx) = self.images.dim();
        (nx, ny)
    }
}

fn rows_to_plane(channel: &str, rows: &[Vec<f32>]) -> Result<Array2<f32>> {
    let ny = rows.len();
    let nx = rows.first().map_or(0, Vec::len);
    if ny == 0 || nx == 0 {
        return Err(dataset_error(format!("channel '{}' image is empty", channel)));
    }
    if rows.iter().any(|r| r.len() != nx) {
        return Err(dataset_error(format!("channel '{}' image is ragged", channel)));
    }
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((ny, nx), flat)
        .map_err(|e| dataset_error(format!("channel '{}': {}", channel, e)))
}

fn dataset_error(message: impl Into<String>) -> MicroscopeError {
    MicroscopeError::Dataset {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(json: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();
        file
    }

    #[test]
    fn test_parse_data_source() {
        assert_eq!(
            DataSource::parse("synthetic:50x40").unwrap(),
            DataSource::Synthetic { nx: 50, ny: 40 }
        );
        assert_eq!(
            DataSource::parse("data/AFM/scan.json").unwrap(),
            DataSource::File(PathBuf::from("data/AFM/scan.json"))
        );
        assert!(DataSource::parse("").is_err());
        assert!(DataSource::parse("synthetic:0x4").is_err());
        assert!(DataSource::parse("synthetic:abc").is_err());
        assert!(DataSource::parse("synthetic:99999x2").is_err());
    }

    #[test]
    fn test_synthetic_dataset() {
        let ds = Dataset::synthetic(8, 6);
        assert_eq!(ds.images.dim(), (3, 6, 8));
        assert_eq!(ds.grid(), (8, 6));
        assert_eq!(ds.channels, vec!["Height", "Amplitude", "Phase"]);
        assert!(ds.images.iter().all(|v| v.is_finite()));
        assert_eq!(ds.start, Position { x: 0.0, y: 0.0 });

        // Deterministic across calls.
        assert_eq!(ds.images, Dataset::synthetic(8, 6).images);
    }

    #[tokio::test]
    async fn test_load_file_dataset() {
        let file = write_dataset(serde_json::json!({
            "name": "pto",
            "channels": ["Height", "Phase"],
            "x_range": [0.0, 3.0],
            "y_range": [10.0, 12.0],
            "start_position": [1.0, 11.0],
            "images": {
                "Height": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
                "Phase": [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]
            }
        }));

        let ds = Dataset::from_file(file.path()).await.unwrap();
        assert_eq!(ds.name, "pto");
        assert_eq!(ds.images.dim(), (2, 2, 3));
        assert_eq!(ds.images[[0, 1, 2]], 6.0);
        assert_eq!(ds.bounds.y_min, 10.0);
        assert_eq!(ds.start, Position { x: 1.0, y: 11.0 });
    }

    #[tokio::test]
    async fn test_start_defaults_to_min_corner() {
        let file = write_dataset(serde_json::json!({
            "channels": ["Height"],
            "x_range": [-1.0, 1.0],
            "y_range": [-2.0, 2.0],
            "images": { "Height": [[1.0, 2.0]] }
        }));

        let ds = Dataset::from_file(file.path()).await.unwrap();
        assert_eq!(ds.start, Position { x: -1.0, y: -2.0 });
        assert_eq!(ds.units, "m");
    }

    #[tokio::test]
    async fn test_rejects_invalid_datasets() {
        let ragged = write_dataset(serde_json::json!({
            "channels": ["Height"],
            "x_range": [0.0, 1.0],
            "y_range": [0.0, 1.0],
            "images": { "Height": [[1.0, 2.0], [3.0]] }
        }));
        let err = Dataset::from_file(ragged.path()).await.unwrap_err();
        assert_eq!(err.kind(), "dataset");

        let mismatched = write_dataset(serde_json::json!({
            "channels": ["A", "B"],
            "x_range": [0.0, 1.0],
            "y_range": [0.0, 1.0],
            "images": { "A": [[1.0, 2.0]], "B": [[1.0], [2.0]] }
        }));
        assert!(Dataset::from_file(mismatched.path()).await.is_err());

        let missing_channel = write_dataset(serde_json::json!({
            "channels": ["A", "B"],
            "x_range": [0.0, 1.0],
            "y_range": [0.0, 1.0],
            "images": { "A": [[1.0]] }
        }));
        assert!(Dataset::from_file(missing_channel.path()).await.is_err());

        let inverted = write_dataset(serde_json::json!({
            "channels": ["A"],
            "x_range": [1.0, 0.0],
            "y_range": [0.0, 1.0],
            "images": { "A": [[1.0]] }
        }));
        assert!(Dataset::from_file(inverted.path()).await.is_err());

        let outside_start = write_dataset(serde_json::json!({
            "channels": ["A"],
            "x_range": [0.0, 1.0],
            "y_range": [0.0, 1.0],
            "start_position": [5.0, 0.5],
            "images": { "A": [[1.0]] }
        }));
        assert!(Dataset::from_file(outside_start.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_files() {
        let err = Dataset::from_file(Path::new("/nonexistent/scan.json"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "io");

        let mut corrupt = NamedTempFile::new().unwrap();
        write!(corrupt, "{{not json").unwrap();
        let err = Dataset::from_file(corrupt.path()).await.unwrap_err();
        assert_eq!(err.kind(), "json");
    }
}
