//! Structured logging for edgekit plugins
//!
//! Logs always go to stderr so they never mix with a plugin's stdout, which
//! is frequently piped into other tools.

use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging
///
/// `RUST_LOG` always wins over `config.log_level`.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number)
            .compact());

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(level = %config.log_level, "logging initialized");
    Ok(())
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl TelemetryConfig {
    /// Derive the level from the value of the log-mode variable
    ///
    /// A value naming a level (`debug`, `trace`, `0`-`5`, ...) selects it, any other
    /// non-empty value means `info`, and an unset or empty value keeps
    /// logging at `warn`.
    pub fn from_log_setting(setting: Option<&str>) -> Self {
        let log_level = match setting.map(str::trim).filter(|s| !s.is_empty()) {
            None => LevelFilter::WARN,
            Some(value) => LevelFilter::from_str(value).unwrap_or(LevelFilter::INFO),
        };

        Self {
            log_level: log_level.to_string().to_lowercase(),
            show_target: log_level >= LevelFilter::DEBUG,
            ..Self::default()
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Time since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and log the duration
    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.name,
            duration_ms = duration.as_millis() as u64,
            "operation completed"
        );
        duration
    }
}
