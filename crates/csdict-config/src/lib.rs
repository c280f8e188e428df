//! Layered configuration for the `csdict` client.
//!
//! Values resolve from built-in defaults, then an optional TOML file
//! (`--config-path` or `CSDICT_CONFIG_PATH`), then `CSDICT_*` environment
//! variables, then command-line flags. The CLI forwards only the flags listed
//! in its configuration allow-list to [`Config::load_from_iter`].

mod defaults;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, default_log_filter_string,
    default_log_format, default_prompt_string,
};
pub use logging::LogFormat;

/// Client configuration shared by the REPL, session and telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CSDICT")]
pub struct Config {
    /// Seconds to wait for the TCP handshake when opening a connection.
    #[ortho_config(default = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,
    /// Seconds to wait for each line read from the server.
    #[ortho_config(default = DEFAULT_READ_TIMEOUT_SECS)]
    pub read_timeout_secs: u64,
    /// Prompt printed before each interactive command.
    #[ortho_config(default = default_prompt_string())]
    pub prompt: String,
    /// `tracing` filter directive for diagnostic logging.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for diagnostic logging.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            prompt: default_prompt_string(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Timeout applied to the TCP handshake.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Timeout applied to every read on an open connection.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Interactive prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
