//! Error types for the process-level runtime.
//!
//! Unlike [`crate::session::SessionError`], every variant here ends the
//! process with a failure status.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Help or version output requested; clap has rendered the text.
    #[error("{0}")]
    CliDisplay(clap::Error),
    #[error("996 Too many command line options - Only -d is allowed")]
    TooManyOptions,
    #[error("997 Invalid command line option - Only -d is allowed")]
    InvalidOption(#[source] clap::Error),
    #[error("998 Input error while reading commands, terminating.")]
    ReadInput(#[source] io::Error),
    #[error("failed to write to the terminal: {0}")]
    WriteOutput(#[source] io::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}
