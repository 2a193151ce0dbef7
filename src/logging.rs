//! Logging configuration and setup.
//!
//! Log records go to stderr so `--json` output on stdout stays clean. The
//! filter is built from `RUST_LOG` when set, from the configured level
//! otherwise.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, config_invalid};

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line format (default).
    #[default]
    Compact,
    /// Multi-line human-readable format.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level filter (e.g., "warn", "debug").
    pub level: String,
    pub format: LogFormat,
    /// Bundle threads are named after their bundle, so names are shown by default.
    pub thread_names: bool,
    pub ansi: bool,
    /// Directive overrides (e.g., `isolated_runner::resolver=trace`).
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            thread_names: true,
            ansi: true,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// `debug` when verbose, the default level otherwise
    #[must_use]
    pub fn for_verbosity(verbose: bool) -> Self {
        if verbose {
            Self::new("debug")
        } else {
            Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Build the env filter from `RUST_LOG` or the configured level.
    fn build_filter(&self) -> Result<EnvFilter> {
        let mut filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(env) if !env.trim().is_empty() => EnvFilter::try_new(env),
            _ => EnvFilter::try_new(&self.level),
        }
        .map_err(|e| config_invalid(format!("log filter: {e}")))?;

        for directive in &self.directives {
            filter = filter.add_directive(
                directive
                    .parse()
                    .map_err(|e: tracing_subscriber::filter::ParseError| {
                        config_invalid(format!("log directive '{directive}': {e}"))
                    })?,
            );
        }
        Ok(filter)
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn setup_logging(config: &LogConfig) -> Result<()> {
    let filter = config.build_filter()?;
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_thread_names(config.thread_names)
        .with_target(false);

    let result = match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init(),
    };
    result.map_err(|e| config_invalid(format!("logging: {e}")))
}
