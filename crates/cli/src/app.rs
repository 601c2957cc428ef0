//! Application bootstrap shared by every plugin
//!
//! A plugin describes itself with an [`AppInfo`], hands over its subcommands
//! through a locator, and gets back an [`App`] with the family conventions
//! applied: naming, credential flags, hidden completion flag, colored help.

use crate::complete::{self, COMPLETION_FLAG};
use crate::env::Environment;
use crate::status::{OutputMode, StatusSlot};
use crate::templates;
use clap::{Arg, ArgAction, ArgMatches, Command};
use edgekit_core::edgerc::{default_edgerc_path, EdgeGridConfig};
use edgekit_core::{Error, Result};
use owo_colors::OwoColorize;
use std::ffi::OsString;

/// Name of the top-level command
pub const CLI_NAME: &str = "edgekit";

/// Footer shown in the application help
pub const COPYRIGHT: &str = "Copyright (C) edgekit contributors";

/// Argument ids of the credential flags
pub mod flags {
    pub const EDGERC: &str = "edgerc";
    pub const SECTION: &str = "section";
    pub const ACCOUNT_KEY: &str = "accountkey";
    pub const NON_INTERACTIVE: &str = "non-interactive";
}

/// What a plugin says about itself
#[derive(Debug, Clone, Default)]
pub struct AppInfo {
    /// Plugin name without the family prefix; empty for the top-level command
    pub command_name: String,
    /// One-line summary
    pub usage: String,
    /// Longer description for `--help`
    pub description: String,
    pub version: String,
    /// Enables the credential flags, defaulting `--section` to this value
    pub default_section: Option<String>,
}

/// `edgekit`, `edgekit-<name>`, or `edgekit <name>` when run by the CLI
pub fn app_name(command_name: &str, in_cli: bool) -> String {
    if command_name.is_empty() {
        CLI_NAME.to_string()
    } else if in_cli {
        format!("{} {}", CLI_NAME, command_name)
    } else {
        format!("{}-{}", CLI_NAME, command_name)
    }
}

/// `--edgerc`, `--section` and `--accountkey`, all global
pub fn credential_args(default_section: &str) -> [Arg; 3] {
    [
        Arg::new(flags::EDGERC)
            .long(flags::EDGERC)
            .value_name("PATH")
            .help("Location of the credentials file")
            .env("EDGEKIT_EDGERC")
            .default_value(default_edgerc_path().display().to_string())
            .global(true),
        Arg::new(flags::SECTION)
            .long(flags::SECTION)
            .value_name("NAME")
            .help("Section of the credentials file")
            .env("EDGEKIT_EDGERC_SECTION")
            .default_value(default_section.to_string())
            .global(true),
        Arg::new(flags::ACCOUNT_KEY)
            .long(flags::ACCOUNT_KEY)
            .value_name("KEY")
            .help("Account switch key")
            .env("EDGEKIT_ACCOUNTKEY")
            .global(true),
    ]
}

/// Build the clap command for a plugin
///
/// A failing `locator` is reported on stderr and the app continues without
/// subcommands.
pub fn create_app<F>(info: &AppInfo, env: &Environment, locator: F) -> Command
where
    F: FnOnce() -> anyhow::Result<Vec<Command>>,
{
    let name = app_name(&info.command_name, env.in_cli);

    let mut app = Command::new(name.clone())
        .bin_name(name)
        .version(info.version.clone())
        .after_help(COPYRIGHT)
        .disable_version_flag(true)
        .disable_help_flag(true)
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::Version)
                .hide(true),
        )
        .arg(
            Arg::new("help")
                .long("help")
                .action(ArgAction::Help)
                .help("show help")
                .global(true),
        )
        .arg(
            Arg::new(COMPLETION_FLAG)
                .long(COMPLETION_FLAG)
                .action(ArgAction::SetTrue)
                .hide(true)
                .global(true),
        );

    if !info.usage.is_empty() {
        app = app.about(info.usage.clone());
    }
    if !info.description.is_empty() {
        app = app.long_about(info.description.clone());
    }
    if let Some(section) = &info.default_section {
        app = app.args(credential_args(section));
    }

    match locator() {
        Ok(commands) => {
            let commands = commands
                .into_iter()
                .map(|cmd| cmd.disable_help_flag(true));
            app = app.subcommands(commands);
        }
        Err(e) => {
            tracing::warn!(error = %e, "command locator failed");
            eprintln!("{}", "An error occurred initializing commands".red());
        }
    }

    templates::apply(app)
}

/// Result of parsing a plugin's command line
#[derive(Debug)]
pub enum Invocation {
    /// Completion was requested; print these one per line
    Complete(Vec<String>),
    /// Regular run
    Run(ArgMatches),
}

/// A bootstrapped plugin
#[derive(Debug, Clone)]
pub struct App {
    command: Command,
    env: Environment,
}

impl App {
    pub fn new<F>(info: &AppInfo, env: Environment, locator: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Vec<Command>>,
    {
        let command = create_app(info, &env, locator);
        Self { command, env }
    }

    /// Adjust the command after bootstrap, e.g. to add plugin-wide flags
    pub fn augment<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Command) -> Command,
    {
        self.command = templates::apply(f(self.command));
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Reporter mode, resolved once from the captured environment
    pub fn output_mode(&self) -> OutputMode {
        self.env.output_mode()
    }

    /// Empty status slot rendering in [`output_mode`](Self::output_mode)
    pub fn status(&self) -> StatusSlot {
        StatusSlot::new(self.output_mode())
    }

    /// Parse the process arguments
    pub fn parse(&self) -> std::result::Result<Invocation, clap::Error> {
        self.parse_from(std::env::args_os())
    }

    /// Parse `args`, whose first element is the program name
    ///
    /// Completion is detected before clap validates anything, so partial
    /// command lines still complete.
    pub fn parse_from<I, T>(&self, args: I) -> std::result::Result<Invocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let words: Vec<String> = args
            .iter()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        if complete::requested(&words) {
            return Ok(Invocation::Complete(complete::candidates(&self.command, &words)));
        }

        self.command
            .clone()
            .try_get_matches_from(args)
            .map(Invocation::Run)
    }
}

/// Matches of the most deeply nested subcommand
pub fn leaf_matches(matches: &ArgMatches) -> &ArgMatches {
    let mut current = matches;
    while let Some((_, sub)) = current.subcommand() {
        current = sub;
    }
    current
}

/// Load credentials named by `--edgerc`, `--section` and `--accountkey`
pub fn credentials(matches: &ArgMatches) -> Result<EdgeGridConfig> {
    let leaf = leaf_matches(matches);
    let lookup = |id: &str| {
        leaf.try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(String::as_str)
    };

    let edgerc = lookup(flags::EDGERC)
        .ok_or_else(|| Error::config("This command does not accept credentials"))?;
    let section = lookup(flags::SECTION).unwrap_or_default();

    Ok(EdgeGridConfig::load(edgerc, section)?.with_account_key(lookup(flags::ACCOUNT_KEY)))
}

/// Whether stdout is a terminal and `--non-interactive` was not given
pub fn is_interactive(matches: &ArgMatches) -> bool {
    let non_interactive = matches!(
        leaf_matches(matches).try_get_one::<bool>(flags::NON_INTERACTIVE),
        Ok(Some(true))
    );
    crate::terminal::is_interactive(non_interactive)
}
