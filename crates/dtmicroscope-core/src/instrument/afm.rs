//! Digital-twin atomic force microscope.
//!
//! Replays a [`Dataset`]: a full scan returns the selected channel images, a
//! line scan returns the row or column nearest to the requested coordinate.

use super::dataset::Dataset;
use super::InstrumentSession;
use crate::config::InstrumentKind;
use crate::error::{MicroscopeError, Result};
use crate::models::{Bounds, ChannelSelection, Position, ScanDirection};
use ndarray::{Array3, ArrayD, Axis};
use tracing::debug;

/// AFM session over a loaded dataset.
#[derive(Debug, Clone)]
pub struct AfmMicroscope {
    data_source: String,
    dataset: Dataset,
    position: Position,
}

impl AfmMicroscope {
    /// Create a session with the tip at the dataset's starting position.
    pub fn new(data_source: impl Into<String>, dataset: Dataset) -> Self {
        let position = dataset.start;
        Self {
            data_source: data_source.into(),
            dataset,
            position,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn channel_indices(&self, selection: &ChannelSelection) -> Result<Vec<usize>> {
        match selection {
            ChannelSelection::InstrumentDefault => Ok((0..self.dataset.channels.len()).collect()),
            ChannelSelection::Named(names) => names
                .iter()
                .map(|name| {
                    self.dataset
                        .channels
                        .iter()
                        .position(|c| c == name)
                        .ok_or_else(|| MicroscopeError::UnknownChannel {
                            channel: name.clone(),
                            available: self.dataset.channels.clone(),
                        })
                })
                .collect(),
        }
    }

    fn selected(&self, selection: &ChannelSelection) -> Result<Array3<f32>> {
        let indices = self.channel_indices(selection)?;
        Ok(self.dataset.images.select(Axis(0), &indices))
    }

    /// Nearest pixel index for a physical coordinate on one axis.
    fn pixel_index(&self, axis: char, coord: f64, n: usize) -> Result<usize> {
        let (min, max) = self.dataset.bounds.axis_range(axis);
        if !coord.is_finite() || coord < min || coord > max {
            return Err(MicroscopeError::CoordinateOutOfRange {
                axis,
                coordinate: coord,
                min,
                max,
            });
        }
        if n <= 1 {
            return Ok(0);
        }
        let frac = (coord - min) / (max - min);
        let index = (frac * (n - 1) as f64).round() as usize;
        Ok(index.min(n - 1))
    }
}

impl InstrumentSession for AfmMicroscope {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Afm
    }

    fn data_source(&self) -> &str {
        &self.data_source
    }

    fn bounds(&self) -> Bounds {
        self.dataset.bounds
    }

    fn position(&self) -> Position {
        self.position
    }

    fn channels(&self) -> &[String] {
        &self.dataset.channels
    }

    fn go_to(&mut self, x: f64, y: f64) -> Result<()> {
        if !self.dataset.bounds.contains(x, y) {
            return Err(MicroscopeError::PositionOutOfRange { x, y });
        }
        debug!(
            "Tip ({}, {}) -> ({}, {})",
            self.position.x, self.position.y, x, y
        );
        self.position = Position { x, y };
        Ok(())
    }

    fn get_scan(
        &self,
        channels: &ChannelSelection,
        direction: ScanDirection,
    ) -> Result<ArrayD<f32>> {
        let images = self.selected(channels)?;
        let scan = match direction {
            ScanDirection::Horizontal => images,
            ScanDirection::Vertical => images
                .permuted_axes([0, 2, 1])
                .as_standard_layout()
                .to_owned(),
        };
        Ok(scan.into_dyn())
    }

    fn scan_individual_line(
        &self,
        direction: ScanDirection,
        coord: f64,
        channels: &ChannelSelection,
    ) -> Result<ArrayD<f32>> {
        let (nx, ny) = self.dataset.grid();
        let images = self.selected(channels)?;
        let line = match direction {
            ScanDirection::Horizontal => {
                let iy = self.pixel_index('y', coord, ny)?;
                images.index_axis(Axis(1), iy).to_owned()
            }
            ScanDirection::Vertical => {
                let ix = self.pixel_index('x', coord, nx)?;
                images.index_axis(Axis(2), ix).to_owned()
            }
        };
        Ok(line.into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 2 channels, 3 rows (y), 4 columns (x), value = c*100 + y*10 + x.
    fn sample() -> AfmMicroscope {
        let images = Array3::from_shape_fn((2, 3, 4), |(c, y, x)| (c * 100 + y * 10 + x) as f32);
        let dataset = Dataset {
            name: "grid".into(),
            units: "m".into(),
            channels: vec!["Height".into(), "Phase".into()],
            bounds: Bounds {
                x_min: 0.0,
                x_max: 3.0,
                y_min: 0.0,
                y_max: 2.0,
            },
            start: Position { x: 1.0, y: 1.0 },
            images,
        };
        AfmMicroscope::new("test", dataset)
    }

    #[test]
    fn test_starts_at_dataset_start() {
        let afm = sample();
        assert_eq!(afm.position(), Position { x: 1.0, y: 1.0 });
        assert_eq!(afm.channels(), ["Height", "Phase"]);
    }

    #[test]
    fn test_full_scan_horizontal_and_vertical() {
        let afm = sample();
        let h = afm
            .get_scan(&ChannelSelection::InstrumentDefault, ScanDirection::Horizontal)
            .unwrap();
        assert_eq!(h.shape(), &[2, 3, 4]);
        assert_eq!(h[[1, 2, 3]], 123.0);

        let v = afm
            .get_scan(&ChannelSelection::InstrumentDefault, ScanDirection::Vertical)
            .unwrap();
        assert_eq!(v.shape(), &[2, 4, 3]);
        assert_eq!(v[[1, 3, 2]], 123.0);
        assert_eq!(v[[0, 1, 0]], 1.0);
    }

    #[test]
    fn test_channel_selection_order() {
        let afm = sample();
        let scan = afm
            .get_scan(
                &ChannelSelection::Named(vec!["Phase".into(), "Height".into()]),
                ScanDirection::Horizontal,
            )
            .unwrap();
        assert_eq!(scan.shape(), &[2, 3, 4]);
        assert_eq!(scan[[0, 0, 0]], 100.0);
        assert_eq!(scan[[1, 0, 0]], 0.0);

        let err = afm
            .get_scan(
                &ChannelSelection::Named(vec!["Friction".into()]),
                ScanDirection::Horizontal,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "unknown_channel");
    }

    #[test]
    fn test_line_scan_picks_nearest_row_and_column() {
        let afm = sample();
        let row = afm
            .scan_individual_line(
                ScanDirection::Horizontal,
                1.2,
                &ChannelSelection::Named(vec!["Height".into()]),
            )
            .unwrap();
        assert_eq!(row.shape(), &[1, 4]);
        assert_eq!(row.iter().copied().collect::<Vec<f32>>(), vec![10.0, 11.0, 12.0, 13.0]);

        let col = afm
            .scan_individual_line(
                ScanDirection::Vertical,
                3.0,
                &ChannelSelection::InstrumentDefault,
            )
            .unwrap();
        assert_eq!(col.shape(), &[2, 3]);
        assert_eq!(col[[0, 2]], 23.0);
        assert_eq!(col[[1, 0]], 103.0);
    }

    #[test]
    fn test_line_scan_out_of_range() {
        let afm = sample();
        let err = afm
            .scan_individual_line(
                ScanDirection::Horizontal,
                5.0,
                &ChannelSelection::InstrumentDefault,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "coordinate_out_of_range");

        let err = afm
            .scan_individual_line(
                ScanDirection::Vertical,
                f64::NAN,
                &ChannelSelection::InstrumentDefault,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "coordinate_out_of_range");
    }

    #[test]
    fn test_go_to_updates_position_exactly() {
        let mut afm = sample();
        afm.go_to(2.5, 0.25).unwrap();
        assert_eq!(afm.position(), Position { x: 2.5, y: 0.25 });

        let err = afm.go_to(10.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), "position_out_of_range");
        assert_eq!(afm.position(), Position { x: 2.5, y: 0.25 });
    }
}
