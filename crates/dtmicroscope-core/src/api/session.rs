//! Session lifecycle and positioning methods on MicroscopeApi.

use crate::config::InstrumentKind;
use crate::error::Result;
use crate::models::{InitializeResponse, MoveResponse, ScanAreaResponse};
use crate::MicroscopeApi;
use tracing::{info, warn};

impl MicroscopeApi {
    // ========================================
    // Session Lifecycle
    // ========================================

    /// Open a new instrument session and install it, replacing any previous one.
    ///
    /// `data_source` falls back to the configured default. On any failure
    /// (unsupported kind, unreadable dataset) the registry is left untouched.
    pub async fn initialize(
        &self,
        kind: InstrumentKind,
        data_source: Option<&str>,
    ) -> Result<InitializeResponse> {
        let data_source = data_source.unwrap_or(&self.default_data_source);

        let session = match self.factory.open(kind, data_source).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to initialize {} with '{}': {}", kind, data_source, e);
                return Err(e);
            }
        };

        self.registry.set(session).await;
        info!("Microscope {} initialized with data: {}", kind, data_source);
        Ok(InitializeResponse::new(kind, data_source))
    }

    // ========================================
    // Positioning
    // ========================================

    /// Scan-area bounds and current tip position.
    pub async fn get_scan_area(&self) -> Result<ScanAreaResponse> {
        self.registry
            .with_session(|session| Ok(ScanAreaResponse::new(session.bounds(), session.position())))
            .await
    }

    /// Move the tip to `(x, y)`.
    ///
    /// Range checking is the instrument's call; this layer only delegates
    /// and echoes the requested target.
    pub async fn move_tip(&self, x: f64, y: f64) -> Result<MoveResponse> {
        self.registry
            .with_session_mut(|session| session.go_to(x, y))
            .await?;
        Ok(MoveResponse::new(x, y))
    }
}
