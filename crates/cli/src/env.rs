//! Process environment captured once at startup
//!
//! Everything downstream receives an [`Environment`] value instead of reading
//! variables itself.

use crate::status::OutputMode;
use crate::terminal;
use edgekit_telemetry::TelemetryConfig;

/// Non-empty value forces log mode and sets the log level
pub const LOG_ENV: &str = "EDGEKIT_LOG";

/// Present when a plugin is launched by the top-level `edgekit` command
pub const IN_CLI_ENV: &str = "EDGEKIT_CLI";

/// Snapshot of the variables that shape plugin behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Launched as `edgekit <name>` rather than `edgekit-<name>`
    pub in_cli: bool,
    /// Raw value of [`LOG_ENV`]
    pub log: Option<String>,
}

impl Environment {
    /// Read the current process environment
    pub fn capture() -> Self {
        Self::from_lookup(|name| {
            std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
        })
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            in_cli: lookup(IN_CLI_ENV).is_some(),
            log: lookup(LOG_ENV),
        }
    }

    /// Whether [`LOG_ENV`] holds a non-empty value
    pub fn log_mode_requested(&self) -> bool {
        self.log.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Reporter mode for this process's stdout
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::resolve(self.log_mode_requested(), terminal::is_tty())
    }

    /// Logging configuration derived from [`LOG_ENV`]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig::from_log_setting(self.log.as_deref())
    }
}
