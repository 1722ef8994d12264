//! Logging setup.
//!
//! Structured logging through `tracing`. Log lines go to stderr so that
//! stdout carries only shell output.
//!
//! Level priority (highest to lowest):
//! 1. `MINIGIT_LOG` environment variable (any `EnvFilter` directive)
//! 2. `--verbose` (debug)
//! 3. default (warn)

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MINIGIT_LOG";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log debug output when no filter is set in the environment.
    pub verbose: bool,
    /// Colored output.
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            color: true,
        }
    }
}

impl LoggingConfig {
    /// filter directive used when `MINIGIT_LOG` is unset
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "minigit=debug"
        } else {
            "warn"
        }
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Initialize the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    Registry::default()
        .with(config.build_filter())
        .with(
            fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(config.color)
                .with_writer(std::io::stderr),
        )
        .try_init()
}
