//! Shared scaffolding for edgekit plugins
//!
//! Provides everything a plugin binary needs around its own logic:
//! - Application bootstrap (naming, credential flags, version and help)
//! - Shell auto-completion
//! - Colored help templates
//! - Status reporting for long-running operations
//! - Terminal output formatting
//!
//! ```rust,no_run
//! use edgekit_cli::{App, AppInfo, Environment, Invocation};
//!
//! let info = AppInfo {
//!     command_name: "purge".into(),
//!     usage: "Purge cached content".into(),
//!     version: "1.0.0".into(),
//!     default_section: Some("ccu".into()),
//!     ..AppInfo::default()
//! };
//! let app = App::new(&info, Environment::capture(), || Ok(Vec::new()));
//!
//! if let Ok(Invocation::Run(_matches)) = app.parse() {
//!     let mut status = app.status();
//!     status.start("Purging ", "");
//!     status.stop_ok();
//! }
//! ```

pub mod app;
pub mod complete;
pub mod env;
pub mod output;
pub mod status;
pub mod templates;
pub mod terminal;

pub use app::{App, AppInfo, Invocation};
pub use env::Environment;
pub use status::{OutputMode, Outcome, StatusReporter, StatusSlot};
