//! Diagnostic logging initialisation.
//!
//! Logs go to stderr so they never interleave with lookup results on stdout.
//! The `-d` wire echo is user output and does not pass through here.

use std::io::{self, IsTerminal};

use csdict_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use; later calls are no-ops.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| ())
}

fn build_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("warn")]
    #[case("csdict_cli=debug,csdict_protocol=trace")]
    #[case("off")]
    fn accepts_valid_filters(#[case] directive: &str) {
        let config = Config {
            log_filter: directive.to_owned(),
            ..Config::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn rejects_invalid_filters() {
        let config = Config {
            log_filter: String::from("csdict=notalevel"),
            ..Config::default()
        };
        assert!(matches!(
            build_filter(&config),
            Err(TelemetryError::Filter(_))
        ));
    }

    #[test]
    fn repeated_initialisation_is_idempotent() {
        let config = Config::default();
        assert!(initialise(&config).is_ok());
        assert!(initialise(&config).is_ok());
    }
}
