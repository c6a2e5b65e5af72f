//! Error types for Headroom
//!
//! Per-frame operations never fail. Errors only surface where a profile is
//! parsed or validated, a raster surface is allocated or exported, or a
//! driver is started or stopped.

use thiserror::Error;

/// Core Headroom errors
#[derive(Error, Debug)]
pub enum HeadroomError {
    // Configuration errors
    #[error("Invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Invalid profile format: {0}")]
    ProfileFormat(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("I/O error: {0}")]
    Io(String),

    // Raster errors
    #[error("Surface too large: {width}x{height}")]
    SurfaceTooLarge { width: u32, height: u32 },

    #[error("Image export failed: {0}")]
    Image(String),

    // Lifecycle errors
    #[error("Driver already stopped")]
    DriverStopped,
}

impl HeadroomError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        HeadroomError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HeadroomError {
    fn from(err: serde_json::Error) -> Self {
        HeadroomError::ProfileFormat(err.to_string())
    }
}

impl From<std::io::Error> for HeadroomError {
    fn from(err: std::io::Error) -> Self {
        HeadroomError::Io(err.to_string())
    }
}

/// Result type for Headroom operations
pub type HeadroomResult<T> = Result<T, HeadroomError>;
