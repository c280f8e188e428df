use crate::logging::LogFormat;

/// Default TCP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Default interactive prompt.
pub const DEFAULT_PROMPT: &str = "csdict> ";

/// Default log filter expression. Diagnostics stay quiet unless asked for.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Owned prompt value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_prompt_string() -> String {
    DEFAULT_PROMPT.to_owned()
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format. Compact lines read better next to an interactive
/// prompt than JSON.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
