//! DTMicroscope Core - Headless library for driving a digital-twin microscope.
//!
//! This crate owns the stateful control surface: one live instrument session
//! held in a [`SessionRegistry`], operations that check for that session,
//! delegate to it and encode the resulting arrays into transport-safe
//! payloads. It has no transport of its own; the `dtmicroscope-mcp` binary
//! exposes it as MCP tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use dtmicroscope_core::{ChannelSelection, InstrumentKind, MicroscopeApi, ScanDirection};
//!
//! #[tokio::main]
//! async fn main() -> dtmicroscope_core::Result<()> {
//!     let api = MicroscopeApi::new();
//!     api.initialize(InstrumentKind::Afm, Some("synthetic:50x50")).await?;
//!
//!     let area = api.get_scan_area().await?;
//!     println!("x range {:?}", area.x_range);
//!
//!     let scan = api
//!         .perform_full_scan(ChannelSelection::InstrumentDefault, ScanDirection::Horizontal)
//!         .await?;
//!     println!("scan shape {:?}", scan.shape);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod instrument;
pub mod models;
pub mod registry;

mod api;

// Re-export commonly used types
pub use config::InstrumentKind;
pub use encoding::{encode, EncodedArray};
pub use error::{ErrorBody, MicroscopeError, Result};
pub use instrument::{
    AfmMicroscope, DataSource, Dataset, DatasetSessionFactory, InstrumentSession, SessionFactory,
};
pub use models::{
    Bounds, ChannelSelection, InitializeResponse, LineScanResponse, MoveResponse, Position,
    ScanAreaResponse, ScanDirection,
};
pub use registry::SessionRegistry;

pub use api::MicroscopeApiBuilder;

use std::sync::Arc;

/// Main API struct for microscope control.
///
/// Owns the session registry and the factory used to open sessions. Every
/// operation other than [`MicroscopeApi::initialize`] fails with
/// [`MicroscopeError::NotInitialized`] until a session has been installed.
pub struct MicroscopeApi {
    registry: SessionRegistry,
    factory: Arc<dyn SessionFactory>,
    default_data_source: String,
}

impl MicroscopeApi {
    /// Create an API with the dataset-backed factory and default data source.
    pub fn new() -> Self {
        MicroscopeApiBuilder::new().build()
    }

    /// Create a builder for MicroscopeApi.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let api = MicroscopeApi::builder()
    ///     .default_data_source("data/AFM/BEPS_PTO_50x50.json")
    ///     .build();
    /// ```
    pub fn builder() -> MicroscopeApiBuilder {
        MicroscopeApiBuilder::new()
    }

    /// Data source used when initialize is called without one.
    pub fn default_data_source(&self) -> &str {
        &self.default_data_source
    }

    /// The session registry this API operates on.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

impl Default for MicroscopeApi {
    fn default() -> Self {
        Self::new()
    }
}
