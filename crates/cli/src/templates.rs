//! Colored help templates
//!
//! clap templates have no conditionals, so a template is assembled per
//! command from the sections it actually has.

use clap::Command;
use owo_colors::OwoColorize;

/// Which optional sections a command's help needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sections {
    pub description: bool,
    pub arguments: bool,
    pub commands: bool,
    pub flags: bool,
    pub footer: bool,
}

impl Sections {
    /// Inspect `cmd` for the sections it can fill
    pub fn of(cmd: &Command) -> Self {
        Self {
            description: cmd.get_about().is_some() || cmd.get_long_about().is_some(),
            arguments: cmd.get_positionals().any(|a| !a.is_hide_set()),
            commands: cmd.get_subcommands().any(|c| !c.is_hide_set()),
            flags: cmd
                .get_arguments()
                .any(|a| !a.is_positional() && !a.is_hide_set()),
            footer: cmd.get_after_help().is_some(),
        }
    }
}

fn heading(title: &str) -> String {
    format!("{}\n", title.yellow())
}

/// Template for the application itself
pub fn app_template(sections: Sections) -> String {
    let mut t = heading("Usage:");
    t.push_str(&format!("   {}\n\n", "{usage}".blue()));

    if sections.description {
        t.push_str(&heading("Description:"));
        t.push_str("   {about}\n\n");
    }
    if sections.commands {
        t.push_str(&heading("Built-In Commands:"));
        t.push_str("{subcommands}\n\n");
    }
    if sections.arguments {
        t.push_str(&heading("Arguments:"));
        t.push_str("{positionals}\n\n");
    }
    if sections.flags {
        t.push_str(&heading("Global Flags:"));
        t.push_str("{options}\n\n");
    }
    if sections.footer {
        t.push_str(&format!("{}\n", "{after-help}".bright_black()));
    }
    t
}

/// Template for a leaf command
pub fn command_template(sections: Sections) -> String {
    let mut t = heading("Name:");
    t.push_str("   {bin}\n\n");
    t.push_str(&heading("Usage:"));
    t.push_str(&format!("   {}\n\n", "{usage}".blue()));

    if sections.description {
        t.push_str(&heading("Description:"));
        t.push_str("   {about}\n\n");
    }
    if sections.arguments {
        t.push_str(&heading("Arguments:"));
        t.push_str("{positionals}\n\n");
    }
    if sections.flags {
        t.push_str(&heading("Flags:"));
        t.push_str("{options}\n");
    }
    t
}

/// Template for a command that groups further subcommands
pub fn group_template(sections: Sections) -> String {
    let mut t = heading("Name:");
    if sections.description {
        t.push_str("   {bin} - {about}\n\n");
    } else {
        t.push_str("   {bin}\n\n");
    }
    t.push_str(&heading("Usage:"));
    t.push_str(&format!("   {}\n\n", "{usage}".blue()));
    t.push_str(&heading("Commands:"));
    t.push_str("{subcommands}\n\n");

    if sections.flags {
        t.push_str(&heading("Flags:"));
        t.push_str("{options}\n");
    }
    t
}

/// Apply the application template to `app` and command templates below it
pub fn apply(app: Command) -> Command {
    let app = style_children(app);
    let template = app_template(Sections::of(&app));
    app.help_template(template)
}

fn style_command(cmd: Command) -> Command {
    let cmd = style_children(cmd);
    let sections = Sections::of(&cmd);
    let template = if sections.commands {
        group_template(sections)
    } else {
        command_template(sections)
    };
    cmd.help_template(template)
}

fn style_children(cmd: Command) -> Command {
    let names: Vec<String> = cmd
        .get_subcommands()
        .map(|sub| sub.get_name().to_string())
        .collect();

    names
        .iter()
        .fold(cmd, |cmd, name| cmd.mut_subcommand(name, style_command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction};

    fn sample() -> Command {
        Command::new("edgekit-purge")
            .about("Purge content")
            .after_help("Copyright (C) edgekit contributors")
            .arg(Arg::new("section").long("section").global(true))
            .subcommand(
                Command::new("invalidate")
                    .about("Invalidate URLs")
                    .arg(Arg::new("url").required(true))
                    .arg(Arg::new("staging").long("staging").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("list")
                    .subcommand(Command::new("networks").about("List networks")),
            )
    }

    #[test]
    fn test_sections_detection() {
        let cmd = sample();
        let sections = Sections::of(&cmd);
        assert!(sections.description);
        assert!(sections.commands);
        assert!(sections.flags);
        assert!(sections.footer);
        assert!(!sections.arguments);
    }

    #[test]
    fn test_app_template_omits_empty_sections() {
        let template = app_template(Sections::default());
        assert!(template.contains("Usage:"));
        assert!(!template.contains("Description:"));
        assert!(!template.contains("Built-In Commands:"));
        assert!(!template.contains("Global Flags:"));
    }

    #[test]
    fn test_rendered_app_help() {
        let mut app = apply(sample());
        let help = app.render_long_help().to_string();

        assert!(help.contains("Usage:"));
        assert!(help.contains("Description:"));
        assert!(help.contains("Purge content"));
        assert!(help.contains("Built-In Commands:"));
        assert!(help.contains("invalidate"));
        assert!(help.contains("Global Flags:"));
        assert!(help.contains("--section"));
        assert!(help.contains("Copyright (C) edgekit contributors"));
    }

    #[test]
    fn test_rendered_command_help() {
        let mut app = apply(sample());
        app.build();
        let sub = app.find_subcommand_mut("invalidate").unwrap();
        let help = sub.render_long_help().to_string();

        assert!(help.contains("Name:"));
        assert!(help.contains("Arguments:"));
        assert!(help.contains("Flags:"));
        assert!(help.contains("--staging"));
        assert!(!help.contains("Built-In Commands:"));
    }

    #[test]
    fn test_rendered_group_help() {
        let mut app = apply(sample());
        app.build();
        let sub = app.find_subcommand_mut("list").unwrap();
        let help = sub.render_long_help().to_string();

        assert!(help.contains("Commands:"));
        assert!(help.contains("networks"));
    }
}
