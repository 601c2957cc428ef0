//! edgekit-config - manage edgekit settings and credentials
//!
//! Reads and writes the shared plugin configuration file, exports it to
//! child processes, and checks `.edgerc` credentials.

use clap::{Arg, Command, FromArgMatches, Subcommand};
use edgekit_cli::output::Status;
use edgekit_cli::{App, AppInfo, Environment, Invocation};
use edgekit_core::config::{default_config_path, expand_path};
use std::process::ExitCode;

mod commands;

/// Argument id of the config file flag
const CONFIG_ARG: &str = "config";

#[derive(Subcommand)]
enum Commands {
    /// Print a configuration value
    Get {
        /// Section name
        #[arg(id = "config_section", value_name = "SECTION")]
        section: String,
        /// Key name
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Section name
        #[arg(id = "config_section", value_name = "SECTION")]
        section: String,
        /// Key name
        key: String,
        /// New value
        value: String,
    },

    /// Remove a configuration value
    Unset {
        /// Section name
        #[arg(id = "config_section", value_name = "SECTION")]
        section: String,
        /// Key name
        key: String,
    },

    /// List configuration values
    #[command(visible_alias = "ls")]
    List {
        /// Only list this section
        #[arg(id = "config_section", value_name = "SECTION")]
        section: Option<String>,
    },

    /// Print the configuration as shell exports
    Env,

    /// Run a command with the configuration exported to its environment
    Exec {
        /// Program and its arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// Check the selected .edgerc credentials
    Credentials {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn info() -> AppInfo {
    AppInfo {
        command_name: "config".to_string(),
        usage: "Manage edgekit settings and credentials".to_string(),
        description: "Reads and writes the shared plugin configuration, exports it to other \
                      tools and validates .edgerc credentials."
            .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_section: Some(edgekit_core::edgerc::DEFAULT_SECTION.to_string()),
    }
}

fn locate_commands() -> anyhow::Result<Vec<Command>> {
    let root = Commands::augment_subcommands(Command::new("edgekit-config"));
    Ok(root.get_subcommands().cloned().collect())
}

fn config_arg() -> Arg {
    Arg::new(CONFIG_ARG)
        .long(CONFIG_ARG)
        .value_name("PATH")
        .help("Location of the edgekit configuration file")
        .env("EDGEKIT_CONFIG")
        .default_value(default_config_path().display().to_string())
        .global(true)
}

fn main() -> ExitCode {
    let env = Environment::capture();
    if let Err(e) = edgekit_telemetry::init_with_config(env.telemetry()) {
        Status::warning(&e.to_string());
    }

    let app = App::new(&info(), env, locate_commands)
        .augment(|cmd| cmd.arg(config_arg()).subcommand_required(true));

    let matches = match app.parse() {
        Ok(Invocation::Complete(words)) => {
            for word in words {
                println!("{}", word);
            }
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Run(matches)) => matches,
        Err(e) => e.exit(),
    };

    let command = match Commands::from_arg_matches(&matches) {
        Ok(command) => command,
        Err(e) => e.exit(),
    };

    let config_path = edgekit_cli::app::leaf_matches(&matches)
        .get_one::<String>(CONFIG_ARG)
        .map(|p| expand_path(p))
        .unwrap_or_else(default_config_path);

    let mut ctx = commands::Context {
        matches: &matches,
        config_path,
        mode: app.output_mode(),
        status: app.status(),
    };

    tracing::debug!(config = %ctx.config_path.display(), "running");
    match commands::run(command, &mut ctx) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            Status::error(&e.to_string());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
