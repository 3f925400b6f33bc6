//! Scan acquisition methods on MicroscopeApi.

use crate::encoding::{self, EncodedArray};
use crate::error::{MicroscopeError, Result};
use crate::instrument::InstrumentSession;
use crate::models::{ChannelSelection, LineScanResponse, ScanDirection};
use crate::MicroscopeApi;
use tracing::debug;

impl MicroscopeApi {
    /// Acquire a full scan and encode it as `{data, shape, dtype}`.
    ///
    /// Does not move the tip.
    pub async fn perform_full_scan(
        &self,
        channels: ChannelSelection,
        direction: ScanDirection,
    ) -> Result<EncodedArray> {
        self.registry
            .with_session(|session| {
                check_channels(session, &channels)?;
                let scan = session.get_scan(&channels, direction)?;
                debug!("Full {} scan, shape {:?}", direction, scan.shape());
                Ok(encoding::encode(&scan))
            })
            .await
    }

    /// Acquire a single line at `coordinate` on the axis perpendicular to
    /// `direction`; the result is `[n_channels, n_points]`.
    pub async fn scan_line(
        &self,
        direction: ScanDirection,
        coordinate: f64,
        channels: ChannelSelection,
    ) -> Result<LineScanResponse> {
        self.registry
            .with_session(|session| {
                check_channels(session, &channels)?;
                let line = session.scan_individual_line(direction, coordinate, &channels)?;
                debug!(
                    "{} line at {}, shape {:?}",
                    direction,
                    coordinate,
                    line.shape()
                );
                Ok(encoding::encode(&line).into())
            })
            .await
    }
}

/// Reject channel names the session does not expose before delegating.
///
/// `InstrumentSession` implementations are not required to validate
/// selections themselves, so this is the single place the check is owed.
fn check_channels(session: &dyn InstrumentSession, channels: &ChannelSelection) -> Result<()> {
    let ChannelSelection::Named(names) = channels else {
        return Ok(());
    };
    let available = session.channels();
    match names.iter().find(|name| !available.contains(name)) {
        Some(unknown) => Err(MicroscopeError::UnknownChannel {
            channel: unknown.clone(),
            available: available.to_vec(),
        }),
        None => Ok(()),
    }
}
