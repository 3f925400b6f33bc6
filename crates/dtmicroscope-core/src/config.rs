//! Centralized configuration for the digital-twin microscope.
//!
//! This module provides configuration constants for the server surface and
//! the simulated instruments.

use crate::error::{MicroscopeError, Result};

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "DTMicroscope";
    pub const SERVER_NAME: &'static str = "AFM_mcp";
}

/// Protocol and transport configuration.
pub struct ServerConfig;

impl ServerConfig {
    pub const MCP_PROTOCOL_VERSION: &'static str = "2024-11-05";
    pub const MAX_LINE_BYTES: usize = 16 * 1024 * 1024; // 16MB
}

/// Instrument defaults.
pub struct InstrumentConfig;

impl InstrumentConfig {
    pub const DEFAULT_DATA_SOURCE: &'static str = "synthetic:50x50";
    pub const SYNTHETIC_SCHEME: &'static str = "synthetic:";
    pub const SYNTHETIC_EXTENT_M: f64 = 5e-6;
    pub const SYNTHETIC_MAX_PIXELS: usize = 1024;
    pub const SYNTHETIC_CHANNELS: [&'static str; 3] = ["Height", "Amplitude", "Phase"];
}

/// Instrument kinds the server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InstrumentKind {
    #[default]
    Afm,
    Stem,
    Dummy,
}

impl InstrumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Afm => "AFM",
            InstrumentKind::Stem => "STEM",
            InstrumentKind::Dummy => "dummy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "afm" => Some(InstrumentKind::Afm),
            "stem" => Some(InstrumentKind::Stem),
            "dummy" => Some(InstrumentKind::Dummy),
            _ => None,
        }
    }

    /// Parse a kind name; unknown names are reported as unsupported.
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| MicroscopeError::UnsupportedKind {
            kind: s.to_string(),
        })
    }

    /// Whether a session of this kind can actually be built.
    pub fn is_wired(&self) -> bool {
        matches!(self, InstrumentKind::Afm)
    }
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
