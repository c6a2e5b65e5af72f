//! Tracing setup for binaries and test harnesses
//!
//! Library code only emits events; installing a subscriber is left to the
//! process. `HEADROOM_LOG` overrides the default directive, e.g.
//! `HEADROOM_LOG=headroom_motion=trace,info`.

use tracing_subscriber::EnvFilter;

use headroom_core::{HeadroomError, HeadroomResult};

/// Environment variable holding the filter directive
pub const LOG_ENV: &str = "HEADROOM_LOG";

/// Output format of the fmt subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-friendly single line, no targets
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Install a global fmt subscriber.
///
/// Returns `Ok(false)` when a global subscriber is already installed, so
/// repeated calls (tests, embedding hosts) are harmless.
pub fn init_tracing(default_directive: &str, format: LogFormat) -> HeadroomResult<bool> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| HeadroomError::InvalidConfig {
            field: "log_filter",
            reason: e.to_string(),
        })?,
    };

    let installed = match format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init(),
    };
    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let first = init_tracing("warn", LogFormat::Compact).unwrap();
        let second = init_tracing("warn", LogFormat::Json).unwrap();
        // Another test may have installed one first; never two
        assert!(!(first && second));
        assert!(!second);
    }

    #[test]
    fn test_bad_directive_rejected() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let err = init_tracing("headroom=notalevel", LogFormat::Compact).unwrap_err();
        assert!(matches!(err, HeadroomError::InvalidConfig { field: "log_filter", .. }));
    }
}
