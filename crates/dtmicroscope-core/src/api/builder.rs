//! Builder for configuring MicroscopeApi construction.

use std::sync::Arc;

use crate::config::InstrumentConfig;
use crate::instrument::{DatasetSessionFactory, SessionFactory};
use crate::registry::SessionRegistry;
use crate::MicroscopeApi;

/// Builder for configuring MicroscopeApi construction.
///
/// # Example
///
/// ```rust,ignore
/// use dtmicroscope_core::MicroscopeApi;
///
/// let api = MicroscopeApi::builder()
///     .default_data_source("synthetic:128x128")
///     .build();
/// ```
pub struct MicroscopeApiBuilder {
    default_data_source: String,
    factory: Arc<dyn SessionFactory>,
}

impl MicroscopeApiBuilder {
    /// Create a builder with the dataset-backed factory.
    pub fn new() -> Self {
        Self {
            default_data_source: InstrumentConfig::DEFAULT_DATA_SOURCE.to_string(),
            factory: Arc::new(DatasetSessionFactory),
        }
    }

    /// Data source used when initialize is called without one.
    ///
    /// Default: `synthetic:50x50`
    pub fn default_data_source(mut self, source: impl Into<String>) -> Self {
        self.default_data_source = source.into();
        self
    }

    /// Replace the factory that opens instrument sessions.
    pub fn session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Build the API with an empty session registry.
    pub fn build(self) -> MicroscopeApi {
        MicroscopeApi {
            registry: SessionRegistry::new(),
            factory: self.factory,
            default_data_source: self.default_data_source,
        }
    }
}

impl Default for MicroscopeApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_defaults() {
        let api = MicroscopeApiBuilder::new().build();
        assert_eq!(api.default_data_source(), "synthetic:50x50");
        assert!(!api.registry().is_initialized().await);
    }

    #[test]
    fn test_builder_overrides_default_source() {
        let api = MicroscopeApi::builder()
            .default_data_source("data/AFM/scan.json")
            .build();
        assert_eq!(api.default_data_source(), "data/AFM/scan.json");
    }
}
