//! Logging and request observability config

use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One line per event, for terminals
    Compact,

    /// One JSON object per event with span context, for log shippers
    Json,
}

/// Log output and slow-request settings.
#[derive(Debug, Args)]
pub struct ObservabilityConfig {
    /// Default level or filter directives when `RUST_LOG` is unset
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Requests slower than this are logged at warn
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000)]
    pub slow_request_threshold_ms: u64,
}

impl ObservabilityConfig {
    /// Filter used when `RUST_LOG` is unset; keeps chatty client crates at warn.
    #[must_use]
    pub fn default_filter(&self) -> String {
        format!("{},h2=warn,hyper=warn,reqwest=warn,sqlx=warn", self.log_level)
    }
}
