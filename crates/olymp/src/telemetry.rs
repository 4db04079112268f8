//! Tracing subscriber setup for binaries and tests embedding Olymp.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "olymp=info,olymp_store=info";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid filter directive: {0}")]
    Filter(#[from] ParseError),
    #[error("subscriber already installed: {0}")]
    Init(#[from] TryInitError),
}

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
pub fn init(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        // Another test may already have installed one; either way the
        // second call must fail rather than panic.
        let _ = init(DEFAULT_DIRECTIVE);
        assert!(matches!(init(DEFAULT_DIRECTIVE), Err(TelemetryError::Init(_))));
    }
}
