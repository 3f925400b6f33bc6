//! `RwLock`-guarded slot holding at most one instrument session.

use crate::error::{MicroscopeError, Result};
use crate::instrument::InstrumentSession;
use tokio::sync::RwLock;
use tracing::info;

/// Holds the current instrument session, if any.
///
/// Readers (scans, area queries) share the lock; replacing the session and
/// moving the tip take it exclusively, so a replacement never interleaves
/// with an in-flight scan.
#[derive(Default)]
pub struct SessionRegistry {
    slot: RwLock<Option<Box<dyn InstrumentSession>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session`, unconditionally discarding any previous one.
    pub async fn set(&self, session: Box<dyn InstrumentSession>) {
        let mut slot = self.slot.write().await;
        if let Some(previous) = slot.as_ref() {
            info!(
                "Replacing {} session on '{}'",
                previous.kind(),
                previous.data_source()
            );
        }
        *slot = Some(session);
    }

    /// Whether a session has been installed.
    pub async fn is_initialized(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Run `f` against the current session under a shared lock.
    ///
    /// Returns [`MicroscopeError::NotInitialized`] without calling `f` when
    /// the registry is empty.
    pub async fn with_session<R>(
        &self,
        f: impl FnOnce(&dyn InstrumentSession) -> Result<R>,
    ) -> Result<R> {
        let slot = self.slot.read().await;
        let session = slot.as_deref().ok_or(MicroscopeError::NotInitialized)?;
        f(session)
    }

    /// Run `f` against the current session under an exclusive lock.
    pub async fn with_session_mut<R>(
        &self,
        f: impl FnOnce(&mut dyn InstrumentSession) -> Result<R>,
    ) -> Result<R> {
        let mut slot = self.slot.write().await;
        let session = slot.as_deref_mut().ok_or(MicroscopeError::NotInitialized)?;
        f(session)
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.slot.try_read() {
            Ok(slot) if slot.is_some() => "ready",
            Ok(_) => "uninitialized",
            Err(_) => "locked",
        };
        f.debug_struct("SessionRegistry").field("state", &state).finish()
    }
}
