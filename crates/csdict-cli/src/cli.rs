//! Command-line flags for the `csdict` binary.

use clap::Parser;

/// Interactive client for DICT dictionary servers.
///
/// Configuration flags (`--config-path`, `--log-filter`, ...) must appear
/// before `-d`.
#[derive(Parser, Debug)]
#[command(name = "csdict", version)]
pub(crate) struct Cli {
    /// Echoes every request sent (`> `) and status line received (`<-- `).
    #[arg(short = 'd')]
    pub(crate) debug: bool,
}
