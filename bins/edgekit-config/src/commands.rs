//! Command implementations

use crate::Commands;
use clap::ArgMatches;
use edgekit_cli::output::mask;
use edgekit_cli::{OutputMode, StatusSlot};
use edgekit_core::config::ConfigFile;
use edgekit_core::error::exit_codes;
use edgekit_core::{process, Error, Result};
use std::path::PathBuf;

/// Everything a command needs from the surrounding process
pub struct Context<'a> {
    pub matches: &'a ArgMatches,
    pub config_path: PathBuf,
    pub mode: OutputMode,
    pub status: StatusSlot,
}

/// Run `command`, returning the process exit code
pub fn run(command: Commands, ctx: &mut Context<'_>) -> Result<i32> {
    match command {
        Commands::Get { section, key } => {
            let config = ConfigFile::open(&ctx.config_path)?;
            println!("{}", config.get(&section, &key));
            Ok(exit_codes::SUCCESS)
        }
        Commands::Set {
            section,
            key,
            value,
        } => update(ctx, |config| config.set(&section, &key, &value)),
        Commands::Unset { section, key } => update(ctx, |config| config.unset(&section, &key)),
        Commands::List { section } => list(ctx, section.as_deref()),
        Commands::Env => {
            let config = ConfigFile::open(&ctx.config_path)?;
            for (name, value) in config.env_vars() {
                println!("export {}={}", name, shell_quote(&value));
            }
            Ok(exit_codes::SUCCESS)
        }
        Commands::Exec { command } => {
            let config = ConfigFile::open(&ctx.config_path)?;
            let (program, args) = command
                .split_first()
                .ok_or_else(|| Error::process("No command given"))?;
            process::run_streaming(program, args, |cmd| config.export_to(cmd))
        }
        Commands::Credentials { json } => credentials(ctx, json),
    }
}

fn update<F>(ctx: &mut Context<'_>, change: F) -> Result<i32>
where
    F: FnOnce(&mut ConfigFile),
{
    ctx.status.start("Saving configuration... ", "");

    let saved = ConfigFile::open(&ctx.config_path).and_then(|mut config| {
        change(&mut config);
        config.save()
    });

    match saved {
        Ok(()) => {
            ctx.status.stop_ok();
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            ctx.status.stop_fail();
            Err(e)
        }
    }
}

fn list(ctx: &Context<'_>, only: Option<&str>) -> Result<i32> {
    let config = ConfigFile::open(&ctx.config_path)?;
    let sections = match only {
        Some(section) => vec![section.to_string()],
        None => config.sections(),
    };

    for section in sections {
        let entries = config.entries(&section);
        if entries.is_empty() {
            continue;
        }
        println!("[{}]", section);
        for (key, value) in &entries {
            println!("{} = {}", key, value);
        }
        println!();
    }
    Ok(exit_codes::SUCCESS)
}

fn credentials(ctx: &mut Context<'_>, json: bool) -> Result<i32> {
    if json {
        ctx.status = StatusSlot::on_stderr(ctx.mode);
    }
    ctx.status.start("Loading credentials... ", "");

    let creds = match edgekit_cli::app::credentials(ctx.matches) {
        Ok(creds) => {
            ctx.status.stop_ok();
            creds
        }
        Err(e) => {
            ctx.status.stop_fail();
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&creds)?);
        return Ok(exit_codes::SUCCESS);
    }

    println!("host:          {}", creds.host);
    println!("client_token:  {}", mask(&creds.client_token));
    println!("client_secret: {}", mask(&creds.client_secret));
    println!("access_token:  {}", mask(&creds.access_token));
    println!("max_body:      {}", creds.max_body);
    if let Some(key) = &creds.account_key {
        println!("account_key:   {}", key);
    }
    Ok(exit_codes::SUCCESS)
}

/// Single-quote `value` for POSIX shells
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
