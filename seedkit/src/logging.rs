//! Logging configuration for applications embedding seedkit.
//!
//! The library itself only emits `tracing` events and never installs a
//! subscriber on its own. Events never carry secret material.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging setup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoggingError {
    /// A global subscriber is already installed, or installation failed
    #[error("failed to initialise tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Result type for logging operations
pub type LoggingResult<T> = core::result::Result<T, LoggingError>;

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter. If None, `RUST_LOG` is used, falling back to INFO.
    pub level: Option<LevelFilter>,
    /// Whether to output logs to console (stderr).
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            console: true,
        }
    }
}

/// Initialize console logging with the given level.
pub fn init_console_logging(level: LevelFilter) -> LoggingResult<()> {
    init_logging(LoggingConfig {
        level: Some(level),
        console: true,
    })
}

/// Initialize logging with the given configuration.
///
/// If console output is disabled nothing is installed and the tracing macros
/// stay no-ops.
///
/// # Examples
///
/// ```no_run
/// use seedkit::logging::{init_logging, LoggingConfig};
/// use tracing::level_filters::LevelFilter;
///
/// init_logging(LoggingConfig {
///     level: Some(LevelFilter::DEBUG),
///     console: true,
/// })
/// .unwrap();
/// ```
pub fn init_logging(config: LoggingConfig) -> LoggingResult<()> {
    if !config.console {
        return Ok(());
    }

    let env_filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))
}
