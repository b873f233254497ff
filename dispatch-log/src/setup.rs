use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Controls the logging verbosity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Disables all logging.
    Off,
    /// Logs only errors.
    Error,
    /// Logs errors and warnings.
    Warn,
    /// Logs errors, warnings and general information.
    Info,
    /// Logs debug information.
    Debug,
    /// Logs full auxiliary information.
    Trace,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    fn directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Controls the log format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise
    /// [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    ///
    /// ```text
    ///   INFO dispatch_threading::pool: worker pool started
    /// ```
    Pretty,

    /// Simplified plain text output.
    ///
    /// ```text
    /// 2026-08-25T12:10:32Z INFO dispatch_threading::pool: worker pool started
    /// ```
    Simplified,

    /// Dump out JSON lines.
    ///
    /// ```text
    /// {"timestamp":"2026-08-25T12:11:08.729716Z","level":"INFO","fields":{"message":"worker pool started"},"target":"dispatch_threading::pool"}
    /// ```
    Json,
}

/// Controls the logging system.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// The log level for the dispatch crates.
    ///
    /// Overridden by the `RUST_LOG` environment variable if set.
    pub level: LogLevel,

    /// Controls the log output format.
    ///
    /// Defaults to [`LogFormat::Auto`], which detects the best format based
    /// on the TTY.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Auto,
        }
    }
}

/// Initializes the logging system.
///
/// The `RUST_LOG` environment variable takes precedence over the configured
/// level and accepts the full `tracing_subscriber` filter syntax. Calling
/// this more than once, or while another global subscriber is installed,
/// panics.
///
/// # Example
///
/// ```ignore
/// let config = dispatch_log::LogConfig {
///     level: dispatch_log::LogLevel::Debug,
///     ..Default::default()
/// };
///
/// dispatch_log::init(&config);
/// ```
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.directive()));

    let subscriber = tracing_subscriber::registry().with(filter);

    match (config.format, console::user_attended()) {
        (LogFormat::Auto, true) | (LogFormat::Pretty, _) => {
            subscriber.with(fmt::layer().pretty()).init()
        }
        (LogFormat::Auto, false) | (LogFormat::Simplified, _) => {
            subscriber.with(fmt::layer().compact()).init()
        }
        (LogFormat::Json, _) => subscriber.with(fmt::layer().json()).init(),
    }
}
