//! Core utilities for edgekit plugins
//!
//! This crate provides the pieces every plugin shares that have nothing to do
//! with the terminal:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: a section/key INI store with dirty tracking
//! - **Credentials**: EdgeGrid credentials from `.edgerc` or the environment
//! - **Process execution**: running child tools with exported settings
//!
//! # Example
//!
//! ```rust,no_run
//! use edgekit_core::{config::ConfigFile, edgerc::EdgeGridConfig};
//!
//! let mut config = ConfigFile::open("/tmp/edgekit/config")?;
//! config.set("cli", "last-used-section", "papi");
//! config.save()?;
//!
//! let creds = EdgeGridConfig::load("~/.edgerc", "papi")?;
//! println!("{}", creds.host);
//! # Ok::<(), edgekit_core::Error>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod edgerc;
pub mod error;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ConfigFile;
    pub use crate::edgerc::EdgeGridConfig;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
}
