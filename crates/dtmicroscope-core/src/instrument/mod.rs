//! Simulated instruments.
//!
//! The control surface only talks to [`InstrumentSession`]; concrete
//! instruments are produced by a [`SessionFactory`]. [`DatasetSessionFactory`]
//! is the production factory: it builds AFM sessions from datasets and
//! refuses the instrument kinds that are declared but not wired.

mod afm;
mod dataset;

pub use afm::AfmMicroscope;
pub use dataset::{DataSource, Dataset};

use crate::config::InstrumentKind;
use crate::error::{MicroscopeError, Result};
use crate::models::{Bounds, ChannelSelection, Position, ScanDirection};
use ndarray::ArrayD;
use tracing::info;

/// A live, stateful simulated microscope.
pub trait InstrumentSession: Send + Sync {
    fn kind(&self) -> InstrumentKind;

    /// The data source string the session was opened from.
    fn data_source(&self) -> &str;

    fn bounds(&self) -> Bounds;

    fn position(&self) -> Position;

    /// Channel names in the instrument's native order.
    fn channels(&self) -> &[String];

    /// Move the tip. On error the tip stays where it was.
    fn go_to(&mut self, x: f64, y: f64) -> Result<()>;

    /// Acquire every pixel of the scan area for the selected channels.
    fn get_scan(&self, channels: &ChannelSelection, direction: ScanDirection)
        -> Result<ArrayD<f32>>;

    /// Acquire one line. `coord` is fixed on the axis perpendicular to
    /// `direction`: a y value for horizontal lines, an x value for vertical.
    fn scan_individual_line(
        &self,
        direction: ScanDirection,
        coord: f64,
        channels: &ChannelSelection,
    ) -> Result<ArrayD<f32>>;
}

/// Opens instrument sessions.
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    async fn open(
        &self,
        kind: InstrumentKind,
        data_source: &str,
    ) -> Result<Box<dyn InstrumentSession>>;
}

/// Factory backed by dataset files and the synthetic generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetSessionFactory;

#[async_trait::async_trait]
impl SessionFactory for DatasetSessionFactory {
    async fn open(
        &self,
        kind: InstrumentKind,
        data_source: &str,
    ) -> Result<Box<dyn InstrumentSession>> {
        if !kind.is_wired() {
            return Err(MicroscopeError::UnsupportedKind {
                kind: kind.as_str().to_string(),
            });
        }

        let source = DataSource::parse(data_source)?;
        let dataset = Dataset::load(&source).await?;
        info!(
            "Opened {} session on '{}' ({} channels)",
            kind,
            dataset.name,
            dataset.channels.len()
        );
        Ok(Box::new(AfmMicroscope::new(data_source, dataset)))
    }
}
